//! Peak models for fitting data.
//!
//! This module provides the single `Gaussian` peak over a baseline and the
//! `MultiGaussian` sum of peaks over a shared baseline, together with the
//! full-width conversions used to report their resolution.
//!
//! Widths enter both models as `2·d²` in a denominator, so a zero width makes the
//! value and gradient undefined.

use ndarray::{Array1, ArrayView1};
use tracing::warn;

use super::CurveModel;
use crate::error::{FitError, Result};
use crate::peaks::find_maxima;
use crate::stats;

/// Full width at half maximum of a Gaussian with unit width: 2·√(2·ln 2).
pub const FWHM: f64 = 2.354_820_045_030_949_3;

/// Full width at tenth maximum of a Gaussian with unit width: 2·√(2·ln 10).
pub const FWTM: f64 = 4.291_932_052_578_694;

/// `[FWHM, FWTM]` of a Gaussian with width `d`.
pub fn resolution(width: f64) -> [f64; 2] {
    [width * FWHM, width * FWTM]
}

/// exp(-(t - c)² / (2d²))
fn gauss(t: f64, center: f64, width: f64) -> f64 {
    let diff = t - center;
    (-diff * diff / (2.0 * width * width)).exp()
}

/// A Gaussian peak relaxing to a baseline:
/// f(x) = a + (b - a) * exp(-(x - c)² / (2d²))
///
/// Parameters are baseline `a`, peak height `b`, center `c` and width `d`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gaussian;

impl CurveModel for Gaussian {
    fn value(&self, t: f64, params: ArrayView1<f64>) -> f64 {
        let (a, b, c, d) = (params[0], params[1], params[2], params[3]);
        a + (b - a) * gauss(t, c, d)
    }

    fn gradient(&self, t: f64, params: ArrayView1<f64>) -> Array1<f64> {
        let (a, b, c, d) = (params[0], params[1], params[2], params[3]);
        let g = gauss(t, c, d);
        let diff = t - c;
        let d2 = d * d;
        Array1::from(vec![
            1.0 - g,
            g,
            (b - a) * g * diff / d2,
            (b - a) * g * diff * diff / (d2 * d),
        ])
    }

    fn equation(&self) -> String {
        "y = a + (b-a)*exp(-(x-c)*(x-c)/(2*d*d))".to_string()
    }

    fn name(&self) -> &'static str {
        "Gaussian Fit"
    }

    fn parameter_count(&self) -> usize {
        4
    }

    /// Zero baseline, the highest sample as height, the mean position as center
    /// and unit width.
    fn initial_guess(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<Array1<f64>> {
        Ok(Array1::from(vec![0.0, stats::max(y), stats::mean(x), 1.0]))
    }

    fn peak_count(&self) -> usize {
        1
    }

    fn width_index(&self, peak: usize) -> Option<usize> {
        (peak == 0).then_some(3)
    }
}

/// A sum of Gaussian peaks over a shared baseline:
/// f(x) = a + Σ bᵢ * exp(-(x - cᵢ)² / (2dᵢ²))
///
/// The parameter vector is the baseline followed by one `(bᵢ, cᵢ, dᵢ)` triple per
/// peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiGaussian {
    npeaks: usize,
    peak_tolerance_fraction: f64,
}

impl MultiGaussian {
    /// Default fraction of the highest sample a maximum must stand out by to seed
    /// a peak.
    pub const DEFAULT_PEAK_TOLERANCE_FRACTION: f64 = 0.1;

    /// A model with `npeaks` peaks. At least one peak is required, and the
    /// `3·npeaks + 1` parameters must be countable.
    pub fn new(npeaks: usize) -> Result<Self> {
        if npeaks == 0 {
            return Err(FitError::InvalidModel(
                "a multi-Gaussian model needs at least one peak".to_string(),
            ));
        }
        if npeaks.checked_mul(3).and_then(|n| n.checked_add(1)).is_none() {
            return Err(FitError::InvalidModel(format!(
                "{} peaks need more parameters than can be counted",
                npeaks
            )));
        }
        Ok(Self {
            npeaks,
            peak_tolerance_fraction: Self::DEFAULT_PEAK_TOLERANCE_FRACTION,
        })
    }

    /// Set the peak detection tolerance as a fraction of the highest sample.
    pub fn with_peak_tolerance_fraction(mut self, fraction: f64) -> Self {
        self.peak_tolerance_fraction = fraction;
        self
    }

    pub fn npeaks(&self) -> usize {
        self.npeaks
    }

    pub fn peak_tolerance_fraction(&self) -> f64 {
        self.peak_tolerance_fraction
    }
}

impl CurveModel for MultiGaussian {
    fn value(&self, t: f64, params: ArrayView1<f64>) -> f64 {
        (0..self.npeaks).fold(params[0], |acc, i| {
            let (b, c, d) = (params[3 * i + 1], params[3 * i + 2], params[3 * i + 3]);
            acc + b * gauss(t, c, d)
        })
    }

    fn gradient(&self, t: f64, params: ArrayView1<f64>) -> Array1<f64> {
        let mut result = Array1::zeros(3 * self.npeaks + 1);
        result[0] = 1.0;
        for i in 0..self.npeaks {
            let (b, c, d) = (params[3 * i + 1], params[3 * i + 2], params[3 * i + 3]);
            let g = gauss(t, c, d);
            let diff = t - c;
            let d2 = d * d;
            result[3 * i + 1] = g;
            result[3 * i + 2] = b * g * diff / d2;
            result[3 * i + 3] = b * g * diff * diff / (d2 * d);
        }
        result
    }

    fn equation(&self) -> String {
        format!(
            "y = a + sum[{}, bi*exp(-(x-ci)*(x-ci)/(2*di*di))]",
            self.npeaks
        )
    }

    fn name(&self) -> &'static str {
        "Multi Gaussian Fit"
    }

    fn parameter_count(&self) -> usize {
        3 * self.npeaks + 1
    }

    /// Zero baseline; every peak starts at the highest sample with unit width.
    ///
    /// Centers come from the detected maxima in ascending position order. When fewer
    /// maxima than peaks are found, the remaining centers reuse the first one.
    fn initial_guess(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<Array1<f64>> {
        let max = stats::max(y);
        let mut positions = find_maxima(y, self.peak_tolerance_fraction * max);
        positions.sort_unstable();
        let first = *positions.first().ok_or(FitError::NoPeaksDetected)?;
        if positions.len() < self.npeaks {
            warn!(
                detected = positions.len(),
                requested = self.npeaks,
                "fewer maxima than peaks, reusing the first maximum as center"
            );
        }

        let mut guess = Array1::zeros(3 * self.npeaks + 1);
        for i in 0..self.npeaks {
            let index = positions.get(i).copied().unwrap_or(first);
            guess[3 * i + 1] = max;
            guess[3 * i + 2] = x[index];
            guess[3 * i + 3] = 1.0;
        }
        Ok(guess)
    }

    fn peak_count(&self) -> usize {
        self.npeaks
    }

    fn width_index(&self, peak: usize) -> Option<usize> {
        (peak < self.npeaks).then_some(3 * peak + 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    /// Central-difference check of an analytic gradient.
    fn assert_gradient_matches<M: CurveModel>(model: &M, t: f64, params: &Array1<f64>) {
        let analytic = model.gradient(t, params.view());
        for j in 0..params.len() {
            let h = 1e-6 * params[j].abs().max(1.0);
            let mut up = params.clone();
            let mut down = params.clone();
            up[j] += h;
            down[j] -= h;
            let numeric = (model.value(t, up.view()) - model.value(t, down.view())) / (2.0 * h);
            assert_abs_diff_eq!(analytic[j], numeric, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_resolution_constants() {
        assert_relative_eq!(FWHM, 2.0 * (2.0 * 2f64.ln()).sqrt(), epsilon = 1e-15);
        assert_relative_eq!(FWTM, 2.0 * (2.0 * 10f64.ln()).sqrt(), epsilon = 1e-15);
        let [fwhm, fwtm] = resolution(1.5);
        assert_relative_eq!(fwhm, 1.5 * 2.3548, epsilon = 1e-4);
        assert_relative_eq!(fwtm, 1.5 * 4.2919, epsilon = 1e-4);
    }

    #[test]
    fn test_gaussian_value() {
        let p = array![1.0, 11.0, 5.0, 1.5];
        assert_relative_eq!(Gaussian.value(5.0, p.view()), 11.0);
        // one width away the peak drops to exp(-1/2) of its height above baseline
        assert_relative_eq!(
            Gaussian.value(6.5, p.view()),
            1.0 + 10.0 * (-0.5f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_gaussian_gradient() {
        let p = array![0.5, 10.0, 5.0, 1.5];
        for &t in &[2.0, 4.9, 5.0, 6.3, 9.0] {
            assert_gradient_matches(&Gaussian, t, &p);
        }
    }

    #[test]
    fn test_multi_gaussian_value_and_gradient() {
        let model = MultiGaussian::new(2).unwrap();
        let p = array![0.5, 10.0, 2.0, 0.5, 6.0, 8.0, 0.7];
        assert_eq!(model.parameter_count(), 7);
        assert_relative_eq!(
            model.value(2.0, p.view()),
            0.5 + 10.0 + 6.0 * gauss(2.0, 8.0, 0.7),
            epsilon = 1e-12
        );
        for &t in &[1.0, 2.2, 5.0, 7.6, 8.0] {
            assert_gradient_matches(&model, t, &p);
        }
    }

    #[test]
    fn test_multi_gaussian_rejects_zero_peaks() {
        assert!(matches!(
            MultiGaussian::new(0),
            Err(FitError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_multi_gaussian_rejects_overflowing_peak_count() {
        assert!(matches!(
            MultiGaussian::new(usize::MAX / 3 + 1),
            Err(FitError::InvalidModel(_))
        ));
        assert!(matches!(
            MultiGaussian::new(usize::MAX / 3),
            Err(FitError::InvalidModel(_))
        ));
        let largest = usize::MAX / 3 - 1;
        assert_eq!(
            MultiGaussian::new(largest).unwrap().parameter_count(),
            usize::MAX - 2
        );
    }

    #[test]
    fn test_multi_gaussian_guess_uses_ascending_positions() {
        let x = Array1::linspace(0.0, 10.0, 101);
        // the right peak is taller, so detection reports it first
        let y = x.mapv(|t| 5.0 * gauss(t, 2.0, 0.5) + 10.0 * gauss(t, 8.0, 0.5));
        let guess = MultiGaussian::new(2)
            .unwrap()
            .initial_guess(x.view(), y.view())
            .unwrap();

        assert_eq!(guess[0], 0.0);
        assert_relative_eq!(guess[1], 10.0, epsilon = 1e-9);
        assert_relative_eq!(guess[2], 2.0, epsilon = 1e-9);
        assert_eq!(guess[3], 1.0);
        assert_relative_eq!(guess[5], 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_multi_gaussian_guess_falls_back_to_first_peak() {
        let x = Array1::linspace(0.0, 10.0, 101);
        let y = x.mapv(|t| 10.0 * gauss(t, 3.0, 0.5));
        let guess = MultiGaussian::new(3)
            .unwrap()
            .initial_guess(x.view(), y.view())
            .unwrap();

        for i in 0..3 {
            assert_relative_eq!(guess[3 * i + 2], 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_multi_gaussian_guess_without_peaks() {
        let x = Array1::linspace(0.0, 1.0, 5);
        let y = Array1::from_elem(5, 2.0);
        let result = MultiGaussian::new(1).unwrap().initial_guess(x.view(), y.view());
        assert_eq!(result, Err(FitError::NoPeaksDetected));
    }

    #[test]
    fn test_width_indices() {
        assert_eq!(Gaussian.width_index(0), Some(3));
        assert_eq!(Gaussian.width_index(1), None);
        let model = MultiGaussian::new(2).unwrap();
        assert_eq!(model.width_index(1), Some(6));
        assert_eq!(model.width_index(2), None);
    }
}
