//! Problem definition trait.
//!
//! This module defines the `Problem` trait, which represents a nonlinear
//! least squares problem to be solved with the Levenberg-Marquardt algorithm.

use ndarray::{Array1, Array2};

use crate::error::Result;

/// A trait representing a nonlinear least squares problem.
///
/// The solver minimizes the sum of squared residuals returned by [`Problem::eval`].
/// Implementations must supply the exact Jacobian; no numerical differentiation is
/// performed.
pub trait Problem {
    /// Evaluate the residuals at the given parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameter values at which to evaluate the residuals
    ///
    /// # Returns
    ///
    /// * A vector of residuals, or an error if the evaluation fails
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>>;

    /// Evaluate the Jacobian matrix at the given parameters.
    ///
    /// Entry `[i, j]` is the partial derivative of residual `i` with respect to
    /// parameter `j`.
    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>>;

    /// Get the number of parameters in the problem.
    fn parameter_count(&self) -> usize;

    /// Get the number of residuals in the problem.
    fn residual_count(&self) -> usize;

    /// Evaluate the sum of squared residuals at the given parameters.
    fn eval_cost(&self, params: &Array1<f64>) -> Result<f64> {
        let residuals = self.eval(params)?;
        Ok(residuals.iter().map(|r| r.powi(2)).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitError;
    use approx::assert_relative_eq;
    use ndarray::array;

    /// A simple linear model for testing: f(x) = a * x + b
    struct LinearModel {
        x_data: Array1<f64>,
        y_data: Array1<f64>,
    }

    impl Problem for LinearModel {
        fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
            if params.len() != 2 {
                return Err(FitError::DimensionMismatch(format!(
                    "Expected 2 parameters, got {}",
                    params.len()
                )));
            }
            Ok(self
                .x_data
                .iter()
                .zip(self.y_data.iter())
                .map(|(x, y)| params[0] * x + params[1] - y)
                .collect())
        }

        fn jacobian(&self, _params: &Array1<f64>) -> Result<Array2<f64>> {
            let mut jac = Array2::zeros((self.x_data.len(), 2));
            for (i, &x) in self.x_data.iter().enumerate() {
                jac[[i, 0]] = x;
                jac[[i, 1]] = 1.0;
            }
            Ok(jac)
        }

        fn parameter_count(&self) -> usize {
            2
        }

        fn residual_count(&self) -> usize {
            self.x_data.len()
        }
    }

    #[test]
    fn test_eval_cost() {
        let model = LinearModel {
            x_data: array![1.0, 2.0, 3.0, 4.0, 5.0],
            y_data: array![2.0, 4.0, 6.0, 8.0, 10.0],
        };

        let cost = model.eval_cost(&array![2.0, 0.0]).unwrap();
        assert_relative_eq!(cost, 0.0, epsilon = 1e-10);

        // Residuals are -1..-5 for [a, b] = [1, 0]
        let cost = model.eval_cost(&array![1.0, 0.0]).unwrap();
        let expected_cost = (1..=5).map(|i| (i as f64).powi(2)).sum::<f64>();
        assert_relative_eq!(cost, expected_cost, epsilon = 1e-10);

        assert!(model.eval_cost(&array![1.0]).is_err());
    }
}
