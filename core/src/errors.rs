//! Error types for transaction instrumentation

use std::error::Error;

/// Failure returned by a handler invocation.
///
/// The dispatcher logs these and never hands them back to the emitting caller.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Raised when a circuit breaker is tripped or reported open
///
/// This is the only failure the operations surface to their caller. The
/// message is the formatted `transactionMsg` of the event that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CircuitBreakerOpen {
    pub message: String,
}

impl CircuitBreakerOpen {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Formatted transaction message carried by this failure
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while assembling an [`Eframework`](crate::Eframework)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `applicationId` is required and must not be blank
    #[error("applicationId is required and must not be blank")]
    MissingApplicationId,
    /// An environment variable held something unusable
    #[error("environment variable {name} is invalid: {reason}")]
    InvalidEnv { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_breaker_open_displays_message() {
        let err = CircuitBreakerOpen::new("Trip Circuit Breaker:  {}");
        assert_eq!(err.to_string(), "Trip Circuit Breaker:  {}");
        assert_eq!(err.message(), "Trip Circuit Breaker:  {}");
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::MissingApplicationId.to_string(),
            "applicationId is required and must not be blank"
        );

        let err = ConfigError::InvalidEnv {
            name: "EFRAMEWORK_APPLICATION_ID".to_string(),
            reason: "not unicode".to_string(),
        };
        assert!(err.to_string().contains("EFRAMEWORK_APPLICATION_ID"));
    }

    #[test]
    fn test_handler_error_from_str() {
        let err: HandlerError = "flow rejected event".into();
        assert_eq!(err.to_string(), "flow rejected event");
    }
}
