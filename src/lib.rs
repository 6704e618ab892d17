//! # robust-curve-fit
//!
//! `robust-curve-fit` fits parametric curves to weighted 1-D observations with a
//! Levenberg-Marquardt solver driven by analytic Jacobians, and refines fits
//! against outliers by iteratively reweighted least squares (IRLS).
//!
//! The library provides:
//! - A closed family of models: constant, linear, polynomial, sine, Gaussian and
//!   multi-Gaussian, each with an exact gradient and a data-driven initial guess
//! - A thread-safe [`CurveFitter`] exposing parameters, residuals, R² and, for
//!   peaked models, FWHM/FWTM resolution
//! - Robust refinement through [`IrlsEngine`]
//!
//! ## Basic Usage
//!
//! ```
//! use robust_curve_fit::{CurveFitter, ModelFunction};
//!
//! let x: Vec<f64> = (0..=100).map(|i| i as f64 * 0.1).collect();
//! let y: Vec<f64> = x
//!     .iter()
//!     .map(|x| 10.0 * (-(x - 5.0).powi(2) / (2.0 * 1.5 * 1.5)).exp())
//!     .collect();
//!
//! let fitter = CurveFitter::new(ModelFunction::gaussian(), &x, &y).unwrap();
//! fitter.fit().unwrap();
//! let [fwhm, _fwtm] = fitter.resolution().unwrap();
//! assert!((fwhm - 1.5 * 2.3548).abs() < 1e-3);
//! ```

pub mod error;
pub mod fitter;
pub mod lm;
pub mod model;
pub mod models;
pub mod observations;
pub mod peaks;
pub mod problem;
pub mod robust;
pub mod stats;

// Re-exports for convenience
pub use error::{FitError, Result};
pub use fitter::{CurveFitter, FitReport};
pub use lm::{LevenbergMarquardt, LmConfig, LmResult};
pub use model::ModelProblem;
pub use models::{
    CurveModel, Gaussian, Linear, Mean, ModelFunction, MultiGaussian, Polynomial, Sine, FWHM,
    FWTM,
};
pub use observations::{Observation, WeightedObservations};
pub use problem::Problem;
pub use robust::{IrlsConfig, IrlsEngine, IrlsSummary};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
