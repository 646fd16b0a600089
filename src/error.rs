use thiserror::Error;

/// Failures raised by the estimators.
///
/// Every variant is local to a single call, so a caller sweeping many
/// channels or epochs can skip the failing combination and carry on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DynamicsError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("insufficient data: {required} samples required, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    #[error("no convergence: {0}")]
    NoConvergence(String),

    #[error("undetermined exponent: {finite} finite divergence point(s), at least 2 needed for a fit")]
    UndeterminedExponent { finite: usize },
}

pub type Result<T> = std::result::Result<T, DynamicsError>;

impl DynamicsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DynamicsError::InvalidParameter(msg.into())
    }

    pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
        DynamicsError::NumericalDegeneracy(msg.into())
    }
}
