//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides the nonlinear least-squares solver behind every fit. It
//! consumes a [`Problem`](crate::problem::Problem) with an analytic Jacobian and
//! iterates until one of the tolerances in [`LmConfig`] is met.

pub mod algorithm;
pub mod config;
pub mod convergence;

// Re-export key types
pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::LmConfig;
pub use convergence::{ConvergenceCriteria, ConvergenceStatus};
