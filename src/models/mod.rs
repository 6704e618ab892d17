//! Built-in model implementations for common fitting problems.
//!
//! Every model is a variant of the closed [`ModelFunction`] family and exposes its
//! behaviour through the [`CurveModel`] capability trait: value, analytic gradient,
//! display equation, parameter count and a data-driven default initial guess.

use enum_dispatch::enum_dispatch;
use ndarray::{Array1, ArrayView1};

use crate::error::Result;

mod peak;
mod polynomial;
mod sine;

// Re-export the models
pub use peak::{resolution, Gaussian, MultiGaussian, FWHM, FWTM};
pub use polynomial::{Linear, Mean, Polynomial};
pub use sine::Sine;

/// Parametric curve shape with an analytic Jacobian.
///
/// `params` must hold exactly [`parameter_count`](CurveModel::parameter_count)
/// values; the gradient has the same length and order.
#[enum_dispatch]
pub trait CurveModel {
    /// Model value at `t`.
    fn value(&self, t: f64, params: ArrayView1<f64>) -> f64;

    /// Partial derivatives of [`value`](CurveModel::value) with respect to each
    /// parameter.
    fn gradient(&self, t: f64, params: ArrayView1<f64>) -> Array1<f64>;

    /// Human-readable formula.
    fn equation(&self) -> String;

    /// Display name of the fit.
    fn name(&self) -> &'static str;

    /// Length of the parameter vector.
    fn parameter_count(&self) -> usize;

    /// Default starting point derived from the observed data.
    fn initial_guess(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<Array1<f64>>;

    /// Number of Gaussian peaks described by the parameters.
    fn peak_count(&self) -> usize {
        0
    }

    /// Index of the width parameter of `peak`, if the model has such a peak.
    fn width_index(&self, _peak: usize) -> Option<usize> {
        None
    }
}

/// The closed family of supported curve shapes.
#[enum_dispatch(CurveModel)]
#[derive(Debug, Clone, PartialEq)]
pub enum ModelFunction {
    Mean,
    Linear,
    Polynomial,
    Sine,
    Gaussian,
    MultiGaussian,
}

impl ModelFunction {
    pub fn mean() -> Self {
        Self::Mean(Mean)
    }

    pub fn linear() -> Self {
        Self::Linear(Linear)
    }

    /// Fails when the order leaves no countable coefficient vector.
    pub fn polynomial(order: usize) -> Result<Self> {
        Polynomial::new(order).map(Self::Polynomial)
    }

    pub fn sine() -> Self {
        Self::Sine(Sine)
    }

    pub fn gaussian() -> Self {
        Self::Gaussian(Gaussian)
    }

    /// Fails when `npeaks` is zero.
    pub fn multi_gaussian(npeaks: usize) -> Result<Self> {
        MultiGaussian::new(npeaks).map(Self::MultiGaussian)
    }

    /// Width parameters of every peak, in peak order.
    pub fn width_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.peak_count()).filter_map(move |peak| self.width_index(peak))
    }
}
