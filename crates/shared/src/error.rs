/// Failures surfaced by model construction, engines and backend selection.
///
/// Only [`PricingError::BackendUnavailable`] is recoverable: the caller can
/// retry the same request on the reference engine. Everything else is a
/// programming or configuration error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("accelerated backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("numerically degenerate result: {0}")]
    NumericDegenerate(String),
}

impl PricingError {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_backend_unavailable_is_recoverable() {
        assert!(PricingError::BackendUnavailable("missing".into()).is_recoverable());
        assert!(!PricingError::InvalidConfiguration("n_paths".into()).is_recoverable());
        assert!(!PricingError::invalid_parameter("spot", "must be > 0").is_recoverable());
        assert!(!PricingError::NumericDegenerate("nan".into()).is_recoverable());
    }

    #[test]
    fn test_display_names_parameter() {
        let err = PricingError::invalid_parameter("vol", "must be >= 0, got -0.1");
        let msg = err.to_string();
        assert!(msg.contains("vol"), "{msg}");
        assert!(msg.contains("-0.1"), "{msg}");
    }
}
