//! Weighted observation data.
//!
//! The x, y and weight columns always share length and order: index `i` refers to
//! the same sample in all three.

use ndarray::{Array1, ArrayView1};

use crate::error::{FitError, Result};

/// A single weighted data sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

impl Observation {
    pub fn new(x: f64, y: f64, weight: f64) -> Self {
        Self { x, y, weight }
    }
}

/// Column-oriented collection of weighted observations.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedObservations {
    x: Array1<f64>,
    y: Array1<f64>,
    weights: Array1<f64>,
}

impl WeightedObservations {
    /// Build from x and y with unit weights.
    pub fn unweighted(x: &[f64], y: &[f64]) -> Result<Self> {
        Self::new(x, y, None)
    }

    /// Build from x, y and optional weights, copying every column.
    ///
    /// Fails on mismatched lengths, an empty set, non-finite coordinates, or
    /// weights that are negative or non-finite.
    pub fn new(x: &[f64], y: &[f64], weights: Option<&[f64]>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(FitError::DimensionMismatch(format!(
                "x has {} points, y has {}",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(FitError::NoData);
        }
        if let Some(i) = x.iter().zip(y).position(|(a, b)| !a.is_finite() || !b.is_finite()) {
            return Err(FitError::InvalidInput(format!(
                "observation {} has a non-finite coordinate",
                i
            )));
        }

        let weights = match weights {
            Some(w) => {
                validate_weights(w, x.len())?;
                Array1::from(w.to_vec())
            }
            None => Array1::ones(x.len()),
        };

        Ok(Self {
            x: Array1::from(x.to_vec()),
            y: Array1::from(y.to_vec()),
            weights,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> ArrayView1<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }

    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// Replace the weight column.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<()> {
        validate_weights(weights, self.len())?;
        self.weights = Array1::from(weights.to_vec());
        Ok(())
    }

    /// Iterate over the samples in input order.
    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.weights.iter())
            .map(|((&x, &y), &weight)| Observation { x, y, weight })
    }
}

fn validate_weights(weights: &[f64], expected: usize) -> Result<()> {
    if weights.len() != expected {
        return Err(FitError::DimensionMismatch(format!(
            "expected {} weights, got {}",
            expected,
            weights.len()
        )));
    }
    if let Some(i) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
        return Err(FitError::InvalidInput(format!(
            "weight {} is {}, weights must be finite and non-negative",
            i, weights[i]
        )));
    }
    Ok(())
}
