//! Curve fitting over weighted observations.
//!
//! A [`CurveFitter`] binds one [`ModelFunction`] to a copy of the caller's data and
//! keeps the mutable part of a fit (weights and the current parameter vector) in a
//! [`FitState`] behind a per-instance mutex. Every mutating entry point holds that
//! lock for its whole duration, so a fitter can be shared between threads.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::lm::{LevenbergMarquardt, LmConfig};
use crate::model::{check_parameter_count, data_residuals, ModelProblem};
use crate::models::{resolution, CurveModel, ModelFunction};
use crate::observations::WeightedObservations;
use crate::robust::{IrlsConfig, IrlsEngine, IrlsSummary};
use crate::stats;

/// Mutable fit state: the observations with their current weights and the
/// parameters of the last successful fit.
#[derive(Debug, Clone)]
pub(crate) struct FitState {
    pub(crate) observations: WeightedObservations,
    pub(crate) params: Option<Array1<f64>>,
}

impl FitState {
    /// Fit from the model's data-driven default guess.
    pub(crate) fn fit_default(
        &mut self,
        model: &ModelFunction,
        solver: &LevenbergMarquardt,
    ) -> Result<Array1<f64>> {
        let initial = model.initial_guess(self.observations.x(), self.observations.y())?;
        self.fit_from(model, solver, initial)
    }

    /// Solve from `initial` and replace the stored parameters on success.
    ///
    /// On failure the previous parameters are kept.
    pub(crate) fn fit_from(
        &mut self,
        model: &ModelFunction,
        solver: &LevenbergMarquardt,
        initial: Array1<f64>,
    ) -> Result<Array1<f64>> {
        check_parameter_count(model, initial.view())?;
        let problem = ModelProblem::new(model, &self.observations);
        let result = solver.minimize(&problem, initial)?;
        self.params = Some(result.params.clone());
        Ok(result.params)
    }

    pub(crate) fn fitted_params(&self) -> Result<&Array1<f64>> {
        self.params.as_ref().ok_or(FitError::NotFitted)
    }

    pub(crate) fn residuals(&self, model: &ModelFunction) -> Result<Array1<f64>> {
        let params = self.fitted_params()?;
        Ok(data_residuals(model, &self.observations, params.view()))
    }

    /// `1 − var(residuals) / var(y)`, or zero when y has no spread.
    pub(crate) fn r_squared(&self, model: &ModelFunction) -> Result<f64> {
        let residuals = self.residuals(model)?;
        let y_variance = stats::variance(self.observations.y());
        if y_variance > 0.0 {
            Ok(1.0 - stats::variance(residuals.view()) / y_variance)
        } else {
            Ok(0.0)
        }
    }
}

/// Fits one model to one data set.
///
/// # Example
///
/// ```
/// use robust_curve_fit::{CurveFitter, ModelFunction};
///
/// let x: Vec<f64> = (0..10).map(f64::from).collect();
/// let y: Vec<f64> = x.iter().map(|x| 2.0 + 3.0 * x).collect();
///
/// let fitter = CurveFitter::new(ModelFunction::linear(), &x, &y).unwrap();
/// let params = fitter.fit().unwrap();
/// assert!((params[0] - 2.0).abs() < 1e-6);
/// assert!((params[1] - 3.0).abs() < 1e-6);
/// ```
#[derive(Debug)]
pub struct CurveFitter {
    model: ModelFunction,
    solver: LevenbergMarquardt,
    state: Mutex<FitState>,
}

impl CurveFitter {
    /// Create a fitter with unit weights. The data is copied.
    pub fn new(model: ModelFunction, x: &[f64], y: &[f64]) -> Result<Self> {
        Self::with_optional_weights(model, x, y, None)
    }

    /// Create a fitter with explicit per-sample weights.
    pub fn with_weights(
        model: ModelFunction,
        x: &[f64],
        y: &[f64],
        weights: &[f64],
    ) -> Result<Self> {
        Self::with_optional_weights(model, x, y, Some(weights))
    }

    /// Create a fitter, falling back to unit weights when `weights` is `None`.
    pub fn with_optional_weights(
        model: ModelFunction,
        x: &[f64],
        y: &[f64],
        weights: Option<&[f64]>,
    ) -> Result<Self> {
        let observations = WeightedObservations::new(x, y, weights)?;
        Ok(Self::from_observations(model, observations))
    }

    pub fn from_observations(model: ModelFunction, observations: WeightedObservations) -> Self {
        Self {
            model,
            solver: LevenbergMarquardt::new(),
            state: Mutex::new(FitState {
                observations,
                params: None,
            }),
        }
    }

    /// Replace the solver configuration.
    pub fn with_lm_config(mut self, config: LmConfig) -> Self {
        self.solver = LevenbergMarquardt::with_config(config);
        self
    }

    /// Replace the solver.
    pub fn with_solver(mut self, solver: LevenbergMarquardt) -> Self {
        self.solver = solver;
        self
    }

    pub fn model(&self) -> &ModelFunction {
        &self.model
    }

    pub fn solver(&self) -> &LevenbergMarquardt {
        &self.solver
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, FitState>> {
        self.state.lock().map_err(|_| FitError::LockPoisoned)
    }

    /// Fit from the model's default initial guess and return the parameters.
    pub fn fit(&self) -> Result<Array1<f64>> {
        self.lock()?.fit_default(&self.model, &self.solver)
    }

    /// Fit from an explicit initial guess and return the parameters.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the guess length differs from
    /// [`num_params`](Self::num_params); otherwise any solver error, unchanged.
    pub fn fit_with(&self, initial_guess: &[f64]) -> Result<Array1<f64>> {
        let initial = Array1::from(initial_guess.to_vec());
        self.lock()?.fit_from(&self.model, &self.solver, initial)
    }

    /// Parameters of the last successful fit.
    pub fn params(&self) -> Result<Array1<f64>> {
        self.lock()?.fitted_params().cloned()
    }

    pub fn num_params(&self) -> usize {
        self.model.parameter_count()
    }

    /// `yᵢ − f(xᵢ)` for every sample, in input order.
    pub fn residuals(&self) -> Result<Array1<f64>> {
        self.lock()?.residuals(&self.model)
    }

    /// Goodness of fit as `1 − var(residuals) / var(y)`.
    ///
    /// This uses sample variances rather than sums of squares, so it differs from
    /// the textbook coefficient of determination when residuals have a non-zero
    /// mean. Returns zero when all y values are equal.
    pub fn r_squared(&self) -> Result<f64> {
        self.lock()?.r_squared(&self.model)
    }

    pub fn formula(&self) -> String {
        self.model.equation()
    }

    pub fn name(&self) -> &'static str {
        self.model.name()
    }

    /// Fitted curve value at `x`.
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        let state = self.lock()?;
        Ok(self.model.value(x, state.fitted_params()?.view()))
    }

    /// `[FWHM, FWTM]` of the first (for a Gaussian, the only) peak.
    pub fn resolution(&self) -> Result<[f64; 2]> {
        self.resolution_at(0)
    }

    /// `[FWHM, FWTM]` of peak `peak`.
    ///
    /// # Errors
    ///
    /// `ResolutionUnavailable` for models without peaks or an out-of-range index,
    /// `NotFitted` before the first fit.
    pub fn resolution_at(&self, peak: usize) -> Result<[f64; 2]> {
        let index = self.model.width_index(peak).ok_or_else(|| {
            FitError::ResolutionUnavailable(format!(
                "{} has no peak {} (peaks: {})",
                self.model.name(),
                peak,
                self.model.peak_count()
            ))
        })?;
        let state = self.lock()?;
        Ok(resolution(state.fitted_params()?[index]))
    }

    /// Replace the weights. Does not refit.
    pub fn set_weights(&self, weights: &[f64]) -> Result<()> {
        self.lock()?.observations.set_weights(weights)
    }

    pub fn weights(&self) -> Result<Vec<f64>> {
        Ok(self.lock()?.observations.weights().to_vec())
    }

    pub fn x_points(&self) -> Result<Vec<f64>> {
        Ok(self.lock()?.observations.x().to_vec())
    }

    pub fn y_points(&self) -> Result<Vec<f64>> {
        Ok(self.lock()?.observations.y().to_vec())
    }

    /// Snapshot of the current fit for display.
    pub fn report(&self) -> Result<FitReport> {
        let state = self.lock()?;
        Ok(FitReport {
            name: self.model.name().to_string(),
            formula: self.model.equation(),
            params: state.fitted_params()?.to_vec(),
            r_squared: state.r_squared(&self.model)?,
        })
    }

    /// Fit once with the current weights, then down-weight samples by their
    /// relative absolute residual.
    pub fn initialize_irls(&self) -> Result<()> {
        IrlsEngine::new(self).initialize()
    }

    /// Run up to `iterations` reweighted refits with the default configuration.
    pub fn run_irls(&self, iterations: usize) -> Result<IrlsSummary> {
        IrlsEngine::new(self).run(iterations)
    }

    /// Run IRLS refits with a custom configuration.
    pub fn run_irls_with(&self, config: IrlsConfig, iterations: usize) -> Result<IrlsSummary> {
        IrlsEngine::with_config(self, config).run(iterations)
    }
}

/// A snapshot of a finished fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub name: String,
    pub formula: String,
    pub params: Vec<f64>,
    pub r_squared: f64,
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  {}", self.formula)?;
        for (i, value) in self.params.iter().enumerate() {
            writeln!(f, "  {} = {:.6}", parameter_label(i), value)?;
        }
        write!(f, "  R^2 = {:.6}", self.r_squared)
    }
}

/// `a`, `b`, ... `z`, then `p26`, `p27`, ...
fn parameter_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'a' + i).to_string(),
        _ => format!("p{}", index),
    }
}
