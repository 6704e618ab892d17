//! Robust fitting by iteratively reweighted least squares.
//!
//! Samples are down-weighted by their share of the residual norm: with absolute
//! residuals `|r|`, the new weights are `1 − |r| / ‖r‖`. A sample carrying most of
//! the misfit ends up with a weight near zero while well-fitted samples keep a
//! weight near one. Refits continue until the goodness of fit passes a threshold
//! or the iteration budget runs out; both are normal outcomes.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::fitter::CurveFitter;
use crate::stats;

/// Configuration for the IRLS loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrlsConfig {
    /// Stop as soon as R² exceeds this value. Default: 0.9
    pub r_squared_threshold: f64,
}

impl Default for IrlsConfig {
    fn default() -> Self {
        Self {
            r_squared_threshold: 0.9,
        }
    }
}

impl IrlsConfig {
    pub fn with_r_squared_threshold(mut self, threshold: f64) -> Self {
        self.r_squared_threshold = threshold;
        self
    }
}

/// Outcome of [`IrlsEngine::run`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrlsSummary {
    /// Refits performed
    pub iterations: usize,
    /// R² of the current parameters when the loop stopped
    pub r_squared: f64,
    /// Whether the loop stopped on the R² threshold
    pub converged: bool,
}

/// Weights `1 − normalize(|residuals|)`.
///
/// An all-zero residual vector has no norm to divide by and yields unit weights.
pub fn irls_weights(residuals: ArrayView1<f64>) -> Array1<f64> {
    let absolute = residuals.mapv(f64::abs);
    stats::normalize(absolute.view()).mapv(|r| 1.0 - r)
}

/// Drives reweighted refits of a [`CurveFitter`].
///
/// Both entry points hold the fitter lock for their whole run, so weights and
/// parameters never interleave with another caller's fit.
pub struct IrlsEngine<'a> {
    fitter: &'a CurveFitter,
    config: IrlsConfig,
}

impl<'a> IrlsEngine<'a> {
    pub fn new(fitter: &'a CurveFitter) -> Self {
        Self::with_config(fitter, IrlsConfig::default())
    }

    pub fn with_config(fitter: &'a CurveFitter, config: IrlsConfig) -> Self {
        Self { fitter, config }
    }

    pub fn config(&self) -> &IrlsConfig {
        &self.config
    }

    /// One fit from the default guess with the current weights, then a single
    /// weight update from its residuals.
    pub fn initialize(&self) -> Result<()> {
        let model = self.fitter.model();
        let mut state = self.fitter.lock()?;
        state.fit_default(model, self.fitter.solver())?;
        let weights = irls_weights(state.residuals(model)?.view());
        state.observations.set_weights(&weights.to_vec())
    }

    /// Up to `iterations` refits, each starting from the current parameters with
    /// the current weights.
    ///
    /// After a refit whose R² exceeds the threshold the loop stops and the weights
    /// are left as they were. Otherwise the weights are recomputed from the new
    /// residuals. Any fit failure aborts the loop and is returned unchanged.
    ///
    /// # Errors
    ///
    /// `NotFitted` if the fitter has no parameters to start from.
    pub fn run(&self, iterations: usize) -> Result<IrlsSummary> {
        let model = self.fitter.model();
        let solver = self.fitter.solver();
        let mut state = self.fitter.lock()?;

        let mut summary = IrlsSummary {
            iterations: 0,
            r_squared: state.r_squared(model)?,
            converged: false,
        };

        for iteration in 0..iterations {
            let start = state.fitted_params()?.clone();
            state.fit_from(model, solver, start)?;
            let r_squared = state.r_squared(model)?;
            summary.iterations = iteration + 1;
            summary.r_squared = r_squared;
            debug!(iteration, r_squared, "irls refit");

            if r_squared > self.config.r_squared_threshold {
                summary.converged = true;
                break;
            }

            let weights = irls_weights(state.residuals(model)?.view());
            state.observations.set_weights(&weights.to_vec())?;
        }

        Ok(summary)
    }
}
