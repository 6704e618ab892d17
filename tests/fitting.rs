//! Integration tests for fitting each model family.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use robust_curve_fit::{CurveFitter, FitError, ModelFunction, FWHM, FWTM};

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

fn gaussian(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    a + (b - a) * (-(x - c).powi(2) / (2.0 * d * d)).exp()
}

#[test]
fn test_linear_exact_recovery() {
    let x: Vec<f64> = (0..10).map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|x| 2.0 + 3.0 * x).collect();

    let fitter = CurveFitter::new(ModelFunction::linear(), &x, &y).unwrap();
    let params = fitter.fit().unwrap();

    assert_relative_eq!(params[0], 2.0, epsilon = 1e-8);
    assert_relative_eq!(params[1], 3.0, epsilon = 1e-8);
    assert_relative_eq!(fitter.r_squared().unwrap(), 1.0, epsilon = 1e-10);
}

#[test]
fn test_polynomial_exact_recovery() {
    let x = linspace(-2.0, 2.0, 21);
    let y: Vec<f64> = x.iter().map(|x| 1.0 + 2.0 * x + 3.0 * x * x).collect();

    let fitter = CurveFitter::new(ModelFunction::polynomial(2).unwrap(), &x, &y).unwrap();
    let params = fitter.fit().unwrap();

    assert_eq!(fitter.num_params(), 3);
    assert_relative_eq!(params[0], 1.0, epsilon = 1e-8);
    assert_relative_eq!(params[1], 2.0, epsilon = 1e-8);
    assert_relative_eq!(params[2], 3.0, epsilon = 1e-8);
    assert_eq!(fitter.formula(), "y = a0 + a1 * x + a2 * x ^ 2");
}

#[test]
fn test_mean_fit() {
    let x = [0.0, 1.0, 2.0, 3.0];
    let y = [1.0, 3.0, 2.0, 6.0];

    let fitter = CurveFitter::new(ModelFunction::mean(), &x, &y).unwrap();
    let params = fitter.fit().unwrap();

    assert_relative_eq!(params[0], 3.0, epsilon = 1e-8);
    assert_eq!(fitter.name(), "Mean Fit");
}

#[test]
fn test_gaussian_exact_recovery_and_resolution() {
    let x = linspace(0.0, 10.0, 101);
    let y: Vec<f64> = x.iter().map(|&x| gaussian(x, 0.0, 10.0, 5.0, 1.5)).collect();

    let fitter = CurveFitter::new(ModelFunction::gaussian(), &x, &y).unwrap();
    let params = fitter.fit().unwrap();

    assert_abs_diff_eq!(params[0], 0.0, epsilon = 1e-6);
    assert_relative_eq!(params[1], 10.0, max_relative = 1e-3);
    assert_relative_eq!(params[2], 5.0, max_relative = 1e-3);
    assert_relative_eq!(params[3], 1.5, max_relative = 1e-3);

    let [fwhm, fwtm] = fitter.resolution().unwrap();
    assert_relative_eq!(fwhm, 1.5 * 2.3548, max_relative = 1e-3);
    assert_relative_eq!(fwtm, 1.5 * 4.2919, max_relative = 1e-3);
    assert_relative_eq!(fwhm, params[3] * FWHM);
    assert_relative_eq!(fwtm, params[3] * FWTM);
}

#[test]
fn test_noisy_gaussian() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let noise = Normal::new(0.0, 0.05).unwrap();
    let x = linspace(0.0, 10.0, 201);
    let y: Vec<f64> = x
        .iter()
        .map(|&x| gaussian(x, 1.0, 8.0, 4.5, 1.2) + noise.sample(&mut rng))
        .collect();

    let fitter = CurveFitter::new(ModelFunction::gaussian(), &x, &y).unwrap();
    let params = fitter.fit().unwrap();

    assert_abs_diff_eq!(params[0], 1.0, epsilon = 0.05);
    assert_abs_diff_eq!(params[1], 8.0, epsilon = 0.05);
    assert_abs_diff_eq!(params[2], 4.5, epsilon = 0.02);
    assert_relative_eq!(params[3], 1.2, max_relative = 0.02);
    assert!(fitter.r_squared().unwrap() > 0.99);
}

#[test]
fn test_multi_gaussian_two_peaks() {
    let x = linspace(0.0, 10.0, 201);
    let y: Vec<f64> = x
        .iter()
        .map(|&x| gaussian(x, 0.0, 10.0, 2.0, 0.5) + gaussian(x, 0.0, 10.0, 8.0, 0.5))
        .collect();

    let fitter = CurveFitter::new(ModelFunction::multi_gaussian(2).unwrap(), &x, &y).unwrap();
    let params = fitter.fit().unwrap();

    assert_eq!(params.len(), 7);
    assert_abs_diff_eq!(params[2], 2.0, epsilon = 0.5);
    assert_abs_diff_eq!(params[5], 8.0, epsilon = 0.5);
    assert!(params[2] < params[5]);

    let [first, _] = fitter.resolution_at(0).unwrap();
    let [second, _] = fitter.resolution_at(1).unwrap();
    assert_relative_eq!(first, params[3] * FWHM);
    assert_relative_eq!(second, params[6] * FWHM);
    assert!(matches!(
        fitter.resolution_at(2),
        Err(FitError::ResolutionUnavailable(_))
    ));
}

#[test]
fn test_sine_recovery() {
    let n = 40;
    let c = 2.0 * std::f64::consts::PI / n as f64;
    let x: Vec<f64> = (0..n).map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|t| 1.0 + 2.0 * (c * t + 0.3).sin()).collect();

    let fitter = CurveFitter::new(ModelFunction::sine(), &x, &y).unwrap();
    let params = fitter.fit().unwrap();

    assert_relative_eq!(params[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(params[1], 2.0, epsilon = 1e-6);
    assert_relative_eq!(params[2], c, epsilon = 1e-8);
    assert_relative_eq!(params[3], 0.3, epsilon = 1e-6);
}

#[test]
fn test_zero_weight_ignores_sample() {
    let x: Vec<f64> = (0..8).map(f64::from).collect();
    let mut y: Vec<f64> = x.iter().map(|x| -1.0 + 0.5 * x).collect();
    y[3] = 100.0;
    let mut weights = vec![1.0; 8];
    weights[3] = 0.0;

    let fitter = CurveFitter::with_weights(ModelFunction::linear(), &x, &y, &weights).unwrap();
    let params = fitter.fit().unwrap();

    assert_relative_eq!(params[0], -1.0, epsilon = 1e-8);
    assert_relative_eq!(params[1], 0.5, epsilon = 1e-8);
}

#[test]
fn test_explicit_initial_guess() {
    let x = linspace(0.0, 10.0, 101);
    let y: Vec<f64> = x.iter().map(|&x| gaussian(x, 0.5, 4.0, 3.0, 0.8)).collect();

    let fitter = CurveFitter::new(ModelFunction::gaussian(), &x, &y).unwrap();
    let params = fitter.fit_with(&[0.0, 3.0, 3.5, 1.0]).unwrap();

    assert_relative_eq!(params[0], 0.5, epsilon = 1e-6);
    assert_relative_eq!(params[1], 4.0, epsilon = 1e-6);
    assert_relative_eq!(params[2], 3.0, epsilon = 1e-6);
    assert_relative_eq!(params[3], 0.8, epsilon = 1e-6);
}

#[test]
fn test_fit_is_idempotent() {
    let x = linspace(0.0, 10.0, 101);
    let y: Vec<f64> = x.iter().map(|&x| gaussian(x, 0.0, 10.0, 5.0, 1.5)).collect();

    let fitter = CurveFitter::new(ModelFunction::gaussian(), &x, &y).unwrap();
    let first = fitter.fit().unwrap();
    assert_eq!(fitter.params().unwrap(), fitter.params().unwrap());

    let second = fitter.fit().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_input_errors() {
    assert_eq!(
        CurveFitter::new(ModelFunction::linear(), &[], &[]).unwrap_err(),
        FitError::NoData
    );
    assert!(matches!(
        CurveFitter::new(ModelFunction::linear(), &[1.0, 2.0], &[1.0]),
        Err(FitError::DimensionMismatch(_))
    ));
    assert!(matches!(
        CurveFitter::with_weights(ModelFunction::linear(), &[1.0, 2.0], &[1.0, 2.0], &[1.0]),
        Err(FitError::DimensionMismatch(_))
    ));
    assert!(matches!(
        ModelFunction::multi_gaussian(0),
        Err(FitError::InvalidModel(_))
    ));
}

#[test]
fn test_singular_jacobian_propagates() {
    // every x is zero, so the slope column of the Jacobian vanishes
    let fitter =
        CurveFitter::new(ModelFunction::linear(), &[0.0; 4], &[1.0, 2.0, 3.0, 4.0]).unwrap();
    let err = fitter.fit().unwrap_err();
    assert_eq!(err, FitError::SingularJacobian);
    assert!(err.is_numerical());
    assert_eq!(fitter.params(), Err(FitError::NotFitted));
}

#[test]
fn test_zero_width_guess_is_rejected() {
    let x = linspace(0.0, 10.0, 11);
    let y: Vec<f64> = x.iter().map(|&x| gaussian(x, 0.0, 10.0, 5.0, 1.5)).collect();

    let fitter = CurveFitter::new(ModelFunction::gaussian(), &x, &y).unwrap();
    assert_eq!(
        fitter.fit_with(&[0.0, 10.0, 5.0, 0.0]).unwrap_err(),
        FitError::ZeroWidth { index: 3 }
    );
}

#[test]
fn test_multi_gaussian_without_peaks() {
    let x = linspace(0.0, 1.0, 10);
    let model = ModelFunction::multi_gaussian(1).unwrap();
    let fitter = CurveFitter::new(model, &x, &[3.0; 10]).unwrap();
    assert_eq!(fitter.fit().unwrap_err(), FitError::NoPeaksDetected);
}

#[test]
fn test_failed_fit_keeps_previous_params() {
    let x: Vec<f64> = (0..10).map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|x| 2.0 + 3.0 * x).collect();

    let fitter = CurveFitter::new(ModelFunction::linear(), &x, &y).unwrap();
    let params = fitter.fit().unwrap();
    assert!(fitter.fit_with(&[1.0]).is_err());
    assert_eq!(fitter.params().unwrap(), params);
}
