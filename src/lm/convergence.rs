//! Convergence criteria for the Levenberg-Marquardt solver.
//!
//! This module defines the criteria used to determine when an accepted step
//! ends the optimization.

use ndarray::Array1;

use super::config::LmConfig;

/// Possible convergence states for an optimization algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// The algorithm is still running.
    Running,

    /// The algorithm has converged due to a small parameter change.
    ParameterConvergence,

    /// The algorithm has converged due to a small function value change.
    FunctionValueConvergence,

    /// The residual vector is orthogonal to every Jacobian column.
    GradientConvergence,

    /// The residuals are exactly zero.
    ZeroResidual,

    /// Damping saturated without finding a step that lowers the cost.
    NoFurtherReduction,

    /// The algorithm has terminated due to reaching the maximum number of iterations.
    MaxIterationsReached,
}

impl ConvergenceStatus {
    /// Returns true if the optimization has terminated (either converged or failed).
    pub fn is_terminated(&self) -> bool {
        !matches!(self, ConvergenceStatus::Running)
    }

    /// Returns true if the optimization has converged.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            ConvergenceStatus::ParameterConvergence
                | ConvergenceStatus::FunctionValueConvergence
                | ConvergenceStatus::GradientConvergence
                | ConvergenceStatus::ZeroResidual
                | ConvergenceStatus::NoFurtherReduction
        )
    }

    /// Returns a description of the convergence status.
    pub fn description(&self) -> &'static str {
        match self {
            ConvergenceStatus::Running => "Optimization is still running",
            ConvergenceStatus::ParameterConvergence => "Converged: small parameter change",
            ConvergenceStatus::FunctionValueConvergence => "Converged: small function value change",
            ConvergenceStatus::GradientConvergence => "Converged: small gradient",
            ConvergenceStatus::ZeroResidual => "Converged: zero residuals",
            ConvergenceStatus::NoFurtherReduction => "Converged: no further reduction possible",
            ConvergenceStatus::MaxIterationsReached => "Terminated: maximum iterations reached",
        }
    }
}

/// Criteria for determining when an optimization algorithm has converged.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceCriteria {
    /// Tolerance for change in parameter values.
    pub xtol: f64,

    /// Tolerance for change in function value.
    pub ftol: f64,

    /// Tolerance for the scaled gradient.
    pub gtol: f64,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self::from(&LmConfig::default())
    }
}

impl From<&LmConfig> for ConvergenceCriteria {
    fn from(config: &LmConfig) -> Self {
        Self {
            xtol: config.xtol,
            ftol: config.ftol,
            gtol: config.gtol,
        }
    }
}

impl ConvergenceCriteria {
    /// Creates a new set of convergence criteria with the given tolerances.
    pub fn new(xtol: f64, ftol: f64, gtol: f64) -> Self {
        Self { xtol, ftol, gtol }
    }

    /// Checks whether an accepted step from `params` to `new_params` ends the
    /// optimization.
    ///
    /// Parameter change is measured relative to `max(|p|, 1)` per component; cost
    /// change relative to the previous cost.
    pub fn check(
        &self,
        params: &Array1<f64>,
        new_params: &Array1<f64>,
        cost: f64,
        new_cost: f64,
    ) -> ConvergenceStatus {
        if new_cost == 0.0 {
            return ConvergenceStatus::ZeroResidual;
        }

        let param_change = new_params
            .iter()
            .zip(params.iter())
            .map(|(a, b)| (a - b).abs() / b.abs().max(1.0))
            .fold(0.0, f64::max);
        if param_change <= self.xtol {
            return ConvergenceStatus::ParameterConvergence;
        }

        let cost_change = (cost - new_cost).abs() / cost;
        if cost_change <= self.ftol {
            return ConvergenceStatus::FunctionValueConvergence;
        }

        ConvergenceStatus::Running
    }

    /// Checks the largest cosine between the residual vector and a Jacobian column.
    ///
    /// `jtr` is `Jᵀr`, `column_norms` the Euclidean norms of the Jacobian columns
    /// and `residual_norm` the norm of `r`. Zero columns are skipped.
    pub fn gradient_converged(
        &self,
        jtr: &[f64],
        column_norms: &[f64],
        residual_norm: f64,
    ) -> bool {
        if residual_norm == 0.0 {
            return true;
        }
        let cosine = jtr
            .iter()
            .zip(column_norms)
            .filter(|(_, &norm)| norm > 0.0)
            .map(|(g, norm)| g.abs() / (norm * residual_norm))
            .fold(0.0, f64::max);
        cosine <= self.gtol
    }
}
