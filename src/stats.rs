//! Array statistics used by the fitters.
//!
//! Reductions over one-dimensional arrays plus NaN-tolerant binary `min2`/`max2`.
//! Array reductions skip NaN entries and return NaN for an empty input.

use ndarray::{Array1, ArrayView1};

/// Returns `a` unless `b` is a number strictly below it.
///
/// `min2(5.0, NaN) == 5.0`, and a NaN `a` is replaced by any numeric `b`.
pub fn min2(a: f64, b: f64) -> f64 {
    if b.is_nan() || b >= a {
        a
    } else {
        b
    }
}

/// Returns `a` unless `b` is a number strictly above it.
///
/// `max2(5.0, NaN) == 5.0`, and a NaN `a` is replaced by any numeric `b`.
pub fn max2(a: f64, b: f64) -> f64 {
    if b.is_nan() || b <= a {
        a
    } else {
        b
    }
}

/// Smallest non-NaN element.
pub fn min(values: ArrayView1<f64>) -> f64 {
    values.iter().fold(f64::NAN, |acc, &v| {
        if acc.is_nan() {
            v
        } else {
            min2(acc, v)
        }
    })
}

/// Largest non-NaN element.
pub fn max(values: ArrayView1<f64>) -> f64 {
    values.iter().fold(f64::NAN, |acc, &v| {
        if acc.is_nan() {
            v
        } else {
            max2(acc, v)
        }
    })
}

/// Arithmetic mean.
pub fn mean(values: ArrayView1<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sum() / values.len() as f64
}

/// Bias-corrected sample variance (denominator `n - 1`).
///
/// A single value has zero variance.
pub fn variance(values: ArrayView1<f64>) -> f64 {
    match values.len() {
        0 => f64::NAN,
        1 => 0.0,
        n => {
            let m = mean(values);
            let sum_sq: f64 = values.iter().map(|&v| (v - m) * (v - m)).sum();
            sum_sq / (n - 1) as f64
        }
    }
}

/// Sum of squared elements.
pub fn sum_of_squares(values: ArrayView1<f64>) -> f64 {
    values.iter().map(|&v| v * v).sum()
}

/// Scale to unit Euclidean norm. A zero vector is returned unchanged.
pub fn normalize(values: ArrayView1<f64>) -> Array1<f64> {
    let norm2 = sum_of_squares(values);
    if norm2 == 0.0 {
        return values.to_owned();
    }
    let norm = norm2.sqrt();
    values.mapv(|v| v / norm)
}
