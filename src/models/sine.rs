//! Sinusoidal model.

use ndarray::{Array1, ArrayView1};
use std::f64::consts::PI;

use super::CurveModel;
use crate::error::Result;
use crate::stats;

/// A sine wave: f(x) = a + b * sin(c * x + d)
///
/// Parameters are offset `a`, amplitude `b`, angular frequency `c` and phase `d`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sine;

impl CurveModel for Sine {
    fn value(&self, t: f64, params: ArrayView1<f64>) -> f64 {
        params[0] + params[1] * (params[2] * t + params[3]).sin()
    }

    fn gradient(&self, t: f64, params: ArrayView1<f64>) -> Array1<f64> {
        let b = params[1];
        let (sin, cos) = (params[2] * t + params[3]).sin_cos();
        Array1::from(vec![1.0, sin, b * t * cos, b * cos])
    }

    fn equation(&self) -> String {
        "y = a + b * sin(c * x + d)".to_string()
    }

    fn name(&self) -> &'static str {
        "Sine Fit"
    }

    fn parameter_count(&self) -> usize {
        4
    }

    /// Offset from the first sample, half the peak-to-peak range as amplitude and
    /// one period over the whole sample count.
    fn initial_guess(&self, _x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<Array1<f64>> {
        let n = y.len() as f64;
        Ok(Array1::from(vec![
            y[0],
            0.5 * (stats::max(y) - stats::min(y)),
            2.0 * PI / n,
            0.0,
        ]))
    }
}
