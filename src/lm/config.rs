//! Configuration options for the Levenberg-Marquardt algorithm.
//!
//! This module defines the convergence tolerances and damping schedule of the
//! solver. The iteration budget defaults to `usize::MAX`, so termination is governed
//! by the tolerances rather than by a cap.

use serde::{Deserialize, Serialize};

/// Configuration options for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Maximum number of iterations. Default: usize::MAX (effectively unbounded)
    pub max_iterations: usize,

    /// Tolerance for the relative reduction of the cost. Default: 1e-10
    pub ftol: f64,

    /// Tolerance for the relative change in parameter values. Default: 1e-10
    pub xtol: f64,

    /// Tolerance for the cosine between residuals and Jacobian columns. Default: 1e-10
    pub gtol: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda after a rejected step. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda after an accepted step. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-12
    pub min_lambda: f64,

    /// Lambda beyond which no further cost reduction is considered possible. Default: 1e16
    pub max_lambda: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: usize::MAX,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-10,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e16,
        }
    }
}
