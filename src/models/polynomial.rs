//! Polynomial models for fitting data.
//!
//! This module provides the constant (`Mean`), straight-line (`Linear`) and
//! general `Polynomial` models. Coefficients are ordered from low to high degree.

use ndarray::{Array1, ArrayView1};

use super::CurveModel;
use crate::error::{FitError, Result};

/// A constant model: f(x) = a
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mean;

impl CurveModel for Mean {
    fn value(&self, _t: f64, params: ArrayView1<f64>) -> f64 {
        params[0]
    }

    fn gradient(&self, _t: f64, _params: ArrayView1<f64>) -> Array1<f64> {
        Array1::ones(1)
    }

    fn equation(&self) -> String {
        "y = a".to_string()
    }

    fn name(&self) -> &'static str {
        "Mean Fit"
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn initial_guess(&self, _x: ArrayView1<f64>, _y: ArrayView1<f64>) -> Result<Array1<f64>> {
        Ok(Array1::zeros(1))
    }
}

/// A straight line: f(x) = a + b * x
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Linear;

impl CurveModel for Linear {
    fn value(&self, t: f64, params: ArrayView1<f64>) -> f64 {
        params[0] + params[1] * t
    }

    fn gradient(&self, t: f64, _params: ArrayView1<f64>) -> Array1<f64> {
        Array1::from(vec![1.0, t])
    }

    fn equation(&self) -> String {
        "y = a + b * x".to_string()
    }

    fn name(&self) -> &'static str {
        "Linear Fit"
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn initial_guess(&self, _x: ArrayView1<f64>, _y: ArrayView1<f64>) -> Result<Array1<f64>> {
        Ok(Array1::zeros(2))
    }
}

/// A polynomial of the given order: f(x) = a0 + a1 * x + ... + an * x^n
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polynomial {
    order: usize,
}

impl Polynomial {
    /// A polynomial of degree `order`. Fails when `order + 1` coefficients
    /// cannot be counted.
    pub fn new(order: usize) -> Result<Self> {
        if order.checked_add(1).is_none() {
            return Err(FitError::InvalidModel(format!(
                "polynomial order {} has too many coefficients",
                order
            )));
        }
        Ok(Self { order })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Powers `1, t, t², …, t^order`, which are also the partial derivatives.
    fn powers(&self, t: f64) -> Array1<f64> {
        let mut term = 1.0;
        Array1::from_iter((0..=self.order).map(|_| {
            let current = term;
            term *= t;
            current
        }))
    }
}

impl CurveModel for Polynomial {
    fn value(&self, t: f64, params: ArrayView1<f64>) -> f64 {
        // Horner's scheme from the highest coefficient down
        params
            .iter()
            .take(self.order + 1)
            .rev()
            .fold(0.0, |acc, &a| acc * t + a)
    }

    fn gradient(&self, t: f64, _params: ArrayView1<f64>) -> Array1<f64> {
        self.powers(t)
    }

    fn equation(&self) -> String {
        let terms: Vec<String> = (0..=self.order)
            .map(|i| match i {
                0 => "a0".to_string(),
                1 => "a1 * x".to_string(),
                _ => format!("a{} * x ^ {}", i, i),
            })
            .collect();
        format!("y = {}", terms.join(" + "))
    }

    fn name(&self) -> &'static str {
        "Polynomial Fit"
    }

    fn parameter_count(&self) -> usize {
        self.order + 1
    }

    fn initial_guess(&self, _x: ArrayView1<f64>, _y: ArrayView1<f64>) -> Result<Array1<f64>> {
        Ok(Array1::ones(self.order + 1))
    }
}
