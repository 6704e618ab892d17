//! Binding of a model function to observed data.
//!
//! This module provides [`ModelProblem`], the adapter that turns a
//! [`ModelFunction`] and a set of [`WeightedObservations`] into a weighted
//! least-squares [`Problem`] for the solver, plus helpers shared by the fitters.

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{FitError, Result};
use crate::models::{CurveModel, ModelFunction};
use crate::observations::WeightedObservations;
use crate::problem::Problem;

/// An adapter that implements `Problem` for a model over weighted observations.
///
/// Residual `i` is `√wᵢ · (f(xᵢ) − yᵢ)` and Jacobian row `i` is `√wᵢ · ∇f(xᵢ)`,
/// so the solver minimizes `Σ wᵢ (f(xᵢ) − yᵢ)²`.
pub struct ModelProblem<'a> {
    /// The model being adapted
    model: &'a ModelFunction,
    /// The data for the fit
    observations: &'a WeightedObservations,
    /// Square roots of the observation weights
    sqrt_weights: Array1<f64>,
}

impl<'a> ModelProblem<'a> {
    /// Create a new ModelProblem adapter.
    pub fn new(model: &'a ModelFunction, observations: &'a WeightedObservations) -> Self {
        Self {
            model,
            observations,
            sqrt_weights: observations.weights().mapv(f64::sqrt),
        }
    }

    /// Get a reference to the model
    pub fn model(&self) -> &ModelFunction {
        self.model
    }

    /// Get a reference to the observations
    pub fn observations(&self) -> &WeightedObservations {
        self.observations
    }

    fn check_params(&self, params: &Array1<f64>) -> Result<()> {
        check_parameter_count(self.model, params.view())?;
        check_widths(self.model, params.view())
    }
}

impl Problem for ModelProblem<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        self.check_params(params)?;
        let p = params.view();
        Ok(Array1::from_iter(
            self.observations
                .iter()
                .zip(self.sqrt_weights.iter())
                .map(|(obs, sw)| sw * (self.model.value(obs.x, p) - obs.y)),
        ))
    }

    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>> {
        self.check_params(params)?;
        let p = params.view();
        let mut jac = Array2::zeros((self.observations.len(), params.len()));
        for ((mut row, &x), &sw) in jac
            .rows_mut()
            .into_iter()
            .zip(self.observations.x().iter())
            .zip(self.sqrt_weights.iter())
        {
            row.assign(&(self.model.gradient(x, p) * sw));
        }
        Ok(jac)
    }

    fn parameter_count(&self) -> usize {
        self.model.parameter_count()
    }

    fn residual_count(&self) -> usize {
        self.observations.len()
    }
}

/// Fail unless `params` has exactly the model's parameter count.
pub fn check_parameter_count(model: &ModelFunction, params: ArrayView1<f64>) -> Result<()> {
    if params.len() != model.parameter_count() {
        return Err(FitError::DimensionMismatch(format!(
            "{} expects {} parameters, got {}",
            model.name(),
            model.parameter_count(),
            params.len()
        )));
    }
    Ok(())
}

/// Fail if any Gaussian width in `params` is exactly zero.
pub fn check_widths(model: &ModelFunction, params: ArrayView1<f64>) -> Result<()> {
    match model.width_indices().find(|&i| params[i] == 0.0) {
        Some(index) => Err(FitError::ZeroWidth { index }),
        None => Ok(()),
    }
}

/// Unweighted data residuals `yᵢ − f(xᵢ)` in input order.
pub fn data_residuals(
    model: &ModelFunction,
    observations: &WeightedObservations,
    params: ArrayView1<f64>,
) -> Array1<f64> {
    Array1::from_iter(
        observations
            .iter()
            .map(|obs| obs.y - model.value(obs.x, params)),
    )
}
