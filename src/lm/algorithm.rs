//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the solver used by every curve fitter: a damped
//! Gauss-Newton iteration on the normal equations with Marquardt (diagonal)
//! scaling, driven entirely by the analytic Jacobian of the problem.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use std::fmt;
use tracing::{debug, trace};

use crate::error::{FitError, Result};
use crate::problem::Problem;

use super::config::LmConfig;
use super::convergence::{ConvergenceCriteria, ConvergenceStatus};

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of residual evaluations
    pub func_evals: usize,

    /// Number of Jacobian evaluations
    pub jac_evals: usize,

    /// Why the iteration stopped
    pub status: ConvergenceStatus,

    /// Whether the optimization converged
    pub success: bool,
}

impl LmResult {
    /// A message describing the result.
    pub fn message(&self) -> &'static str {
        self.status.description()
    }
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message())?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for relative cost reduction.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for the scaled gradient.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// Each iteration solves `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr` by Cholesky
    /// factorization. A step is accepted only if it lowers the cost; otherwise λ
    /// grows and the step is recomputed.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if `initial_params` or an evaluated residual vector or
    ///   Jacobian has the wrong shape
    /// * `NoData` if the problem has no residuals
    /// * `SingularJacobian` if the damped normal matrix is not positive definite
    /// * `NonFinite` if residuals or the Jacobian contain NaN or infinity
    /// * any error raised by the problem itself
    pub fn minimize<P: Problem + ?Sized>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
    ) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(FitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }
        if n_params == 0 {
            return Err(FitError::InvalidModel(
                "problem has no parameters".to_string(),
            ));
        }
        let n_residuals = problem.residual_count();
        if n_residuals == 0 {
            return Err(FitError::NoData);
        }

        let criteria = ConvergenceCriteria::from(&self.config);
        let mut params = initial_params;
        let mut residuals = self.checked_eval(problem, &params, n_residuals)?;
        let mut cost = sum_of_squares(&residuals);
        let mut lambda = self.config.initial_lambda;
        let mut iterations = 0;
        let mut func_evals = 1;
        let mut jac_evals = 0;

        let status = loop {
            if cost == 0.0 {
                break ConvergenceStatus::ZeroResidual;
            }
            if iterations >= self.config.max_iterations {
                break ConvergenceStatus::MaxIterationsReached;
            }

            let jacobian = problem.jacobian(&params)?;
            jac_evals += 1;
            check_jacobian(&jacobian, n_residuals, n_params)?;

            let (jtj, jtr) = normal_equations(&jacobian, &residuals);
            let column_norms: Vec<f64> = jtj.diagonal().iter().map(|d| d.sqrt()).collect();
            if criteria.gradient_converged(jtr.as_slice(), &column_norms, cost.sqrt()) {
                break ConvergenceStatus::GradientConvergence;
            }

            let step_status = loop {
                let step = solve_damped(&jtj, &jtr, lambda)?;
                let new_params = &params + &step;
                let new_residuals = self.checked_eval(problem, &new_params, n_residuals)?;
                func_evals += 1;
                let new_cost = sum_of_squares(&new_residuals);

                if new_cost < cost {
                    let status = criteria.check(&params, &new_params, cost, new_cost);
                    params = new_params;
                    residuals = new_residuals;
                    cost = new_cost;
                    lambda = (lambda * self.config.lambda_down_factor).max(self.config.min_lambda);
                    break status;
                }

                trace!(lambda, cost, new_cost, "step rejected");
                lambda *= self.config.lambda_up_factor;
                if lambda > self.config.max_lambda {
                    break ConvergenceStatus::NoFurtherReduction;
                }
            };

            iterations += 1;
            if step_status.is_terminated() {
                break step_status;
            }
        };

        debug!(
            iterations,
            func_evals,
            cost,
            status = status.description(),
            "levenberg-marquardt finished"
        );

        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            jac_evals,
            success: status.is_converged(),
            status,
        })
    }

    fn checked_eval<P: Problem + ?Sized>(
        &self,
        problem: &P,
        params: &Array1<f64>,
        n_residuals: usize,
    ) -> Result<Array1<f64>> {
        let residuals = problem.eval(params)?;
        if residuals.len() != n_residuals {
            return Err(FitError::DimensionMismatch(format!(
                "Expected {} residuals, got {}",
                n_residuals,
                residuals.len()
            )));
        }
        if residuals.iter().any(|r| !r.is_finite()) {
            return Err(FitError::NonFinite(format!(
                "residuals at parameters {}",
                params
            )));
        }
        Ok(residuals)
    }
}

fn sum_of_squares(values: &Array1<f64>) -> f64 {
    values.iter().map(|r| r * r).sum()
}

fn check_jacobian(jacobian: &Array2<f64>, n_residuals: usize, n_params: usize) -> Result<()> {
    if jacobian.dim() != (n_residuals, n_params) {
        return Err(FitError::DimensionMismatch(format!(
            "Expected Jacobian of shape [{}, {}], got {:?}",
            n_residuals,
            n_params,
            jacobian.shape()
        )));
    }
    if jacobian.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("Jacobian".to_string()));
    }
    Ok(())
}

/// Build `JᵀJ` and `Jᵀr`.
fn normal_equations(
    jacobian: &Array2<f64>,
    residuals: &Array1<f64>,
) -> (DMatrix<f64>, DVector<f64>) {
    let jt = jacobian.t();
    let jtj = jt.dot(jacobian);
    let jtr = jt.dot(residuals);
    let n = jtj.nrows();
    (
        DMatrix::from_fn(n, n, |i, j| jtj[[i, j]]),
        DVector::from_iterator(n, jtr.iter().copied()),
    )
}

/// Solve `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr`.
fn solve_damped(jtj: &DMatrix<f64>, jtr: &DVector<f64>, lambda: f64) -> Result<Array1<f64>> {
    if jtj.diagonal().iter().any(|&d| d <= 0.0) {
        return Err(FitError::SingularJacobian);
    }
    let mut a = jtj.clone();
    for i in 0..a.nrows() {
        a[(i, i)] *= 1.0 + lambda;
    }
    let cholesky = a.cholesky().ok_or(FitError::SingularJacobian)?;
    let step = cholesky.solve(&(-jtr));
    if step.iter().any(|v| !v.is_finite()) {
        return Err(FitError::SingularJacobian);
    }
    Ok(Array1::from_iter(step.iter().copied()))
}
