/// Errors returned by the orientation/coherence pipeline.
///
/// Every stage validates its inputs up front; a failing call produces no
/// partial output.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FibermapError {
    #[error("invalid input image: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl FibermapError {
    pub(crate) fn input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Check that a smoothing scale is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), FibermapError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FibermapError::parameter(
            name,
            value,
            "must be finite and > 0",
        ))
    }
}
