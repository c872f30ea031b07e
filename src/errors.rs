//! # Application Error Types
//!
//! This module defines the error types shared by the food diary library and CLI.
//! Per-candidate extraction failures never surface here; only whole-call
//! failures (bad configuration, invalid input, nutrition lookup failures) do.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Validation errors (diary entry input, quantities)
    Validation(String),
    /// Network/communication errors with the nutrition API
    Network(String),
    /// Nutrition lookup errors (malformed responses, unavailable service)
    Lookup(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Network(msg) => write!(f, "[NETWORK] {}", msg),
            AppError::Lookup(msg) => write!(f, "[LOOKUP] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Lookup(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log network/communication errors with connection context
    pub fn log_network_error(
        error: &impl std::fmt::Display,
        operation: &str,
        endpoint: Option<&str>,
        attempt_count: Option<u32>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            endpoint = ?endpoint,
            attempt_count = ?attempt_count,
            "Network operation failed"
        );
    }

    /// Log nutrition lookup errors with batch context
    pub fn log_lookup_error(
        error: &impl std::fmt::Display,
        operation: &str,
        ingredient_count: Option<usize>,
        processing_duration: Option<std::time::Duration>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            ingredient_count = ?ingredient_count,
            processing_duration_ms = ?processing_duration.map(|d| d.as_millis()),
            "Nutrition lookup failed"
        );
    }

    /// Log validation errors with input context
    pub fn log_validation_error(
        error: &impl std::fmt::Display,
        operation: &str,
        input_type: &str,
        input_value: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            input_type = %input_type,
            input_value = ?input_value.map(|v| {
                if v.chars().count() > 100 {
                    format!("{}...", v.chars().take(100).collect::<String>())
                } else {
                    v.to_string()
                }
            }),
            "Validation failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            AppError::Config("bad".to_string()).to_string(),
            "[CONFIG] bad"
        );
        assert_eq!(
            AppError::Network("HTTP 401".to_string()).to_string(),
            "[NETWORK] HTTP 401"
        );
        assert_eq!(
            AppError::Lookup("no foods".to_string()).to_string(),
            "[LOOKUP] no foods"
        );
    }

    #[test]
    fn test_from_serde_error_is_lookup() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Lookup(_)));
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(AppError::from(err), AppError::Internal("boom".to_string()));
    }
}
