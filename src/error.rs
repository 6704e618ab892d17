use thiserror::Error;

/// Error types for the robust-curve-fit library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Error indicating a mismatch in data or parameter dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// No observations were supplied.
    #[error("No observations to fit")]
    NoData,

    /// The model configuration cannot produce a usable parameter vector.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A query needed fitted parameters but no fit has succeeded yet.
    #[error("Model has not been fitted yet")]
    NotFitted,

    /// The multi-Gaussian initial guess could not find any peak in the data.
    #[error("No peaks detected in the data")]
    NoPeaksDetected,

    /// Resolution was requested for a model or peak that has none.
    #[error("Resolution unavailable: {0}")]
    ResolutionUnavailable(String),

    /// The damped normal equations could not be factorized.
    #[error("Singular Jacobian encountered")]
    SingularJacobian,

    /// A Gaussian width parameter reached zero.
    #[error("Width parameter at index {index} is zero")]
    ZeroWidth {
        /// Position of the offending width in the parameter vector.
        index: usize,
    },

    /// Residuals or Jacobian evaluated to NaN or infinity.
    #[error("Non-finite value: {0}")]
    NonFinite(String),

    /// A previous fit panicked while holding the fitter lock.
    #[error("Fitter state lock poisoned")]
    LockPoisoned,
}

/// Result type alias for robust-curve-fit operations.
pub type Result<T> = std::result::Result<T, FitError>;

impl FitError {
    /// Returns true for failures raised by the numerical solve, as opposed to
    /// input validation.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            FitError::SingularJacobian | FitError::ZeroWidth { .. } | FitError::NonFinite(_)
        )
    }
}
