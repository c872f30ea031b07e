//! # Observability Configuration
//!
//! Environment-specific configuration for logging and metrics.

use crate::errors::{AppError, AppResult};
use std::env;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Observability configuration for different environments
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityConfig {
    /// Environment name (development, staging, production)
    pub environment: String,
    /// Log level for the food_diary crate
    pub log_level: String,
    /// Explicit log format ("pretty" or "json"); defaults by environment
    pub log_format: Option<String>,
    /// Whether to render collected metrics in Prometheus text format on exit
    pub enable_metrics_export: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "warn".to_string(),
            log_format: None,
            enable_metrics_export: false,
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// `ENABLE_METRICS_EXPORT` must be a recognizable boolean; anything else
    /// is a configuration error rather than a silent `false`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let enable_metrics_export = match lookup("ENABLE_METRICS_EXPORT") {
            Some(value) => parse_flag(&value).ok_or_else(|| {
                AppError::Config(format!(
                    "Invalid ENABLE_METRICS_EXPORT: {} (expected true/false, 1/0, yes/no or on/off)",
                    value
                ))
            })?,
            None => false,
        };

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
            log_format: lookup("LOG_FORMAT"),
            enable_metrics_export,
        })
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Whether logs should use the human-readable formatter
    pub fn use_pretty_logs(&self) -> bool {
        match self.log_format.as_deref() {
            Some(format) => format == "pretty",
            None => self.is_development(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.environment.trim().is_empty() {
            return Err(AppError::Config("ENVIRONMENT cannot be empty".to_string()));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "Invalid log level: {}",
                self.log_level
            )));
        }

        if let Some(format) = &self.log_format {
            if format != "pretty" && format != "json" {
                return Err(AppError::Config(format!(
                    "Invalid log format: {} (expected 'pretty' or 'json')",
                    format
                )));
            }
        }

        Ok(())
    }
}

/// Environment-specific configuration presets
pub mod presets {
    use super::ObservabilityConfig;

    /// Development configuration with verbose logging
    pub fn development() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "development".to_string(),
            log_level: "debug".to_string(),
            enable_metrics_export: true,
            ..Default::default()
        }
    }

    /// Production configuration with JSON logs
    pub fn production() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "production".to_string(),
            log_level: "warn".to_string(),
            log_format: Some("json".to_string()),
            ..Default::default()
        }
    }

    /// Minimal configuration that only reports errors
    pub fn minimal() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "minimal".to_string(),
            log_level: "error".to_string(),
            enable_metrics_export: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.environment, "development");
        assert_eq!(config.log_level, "warn");
        assert!(config.log_format.is_none());
        assert!(!config.enable_metrics_export);
        assert!(config.use_pretty_logs());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ObservabilityConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.log_level = "info".to_string();
        config.log_format = Some("xml".to_string());
        assert!(config.validate().is_err());

        config.log_format = Some("json".to_string());
        assert!(config.validate().is_ok());
        assert!(!config.use_pretty_logs());
    }

    #[test]
    fn test_metrics_export_flag_parsing() {
        let lookup = |value: &'static str| {
            move |key: &str| (key == "ENABLE_METRICS_EXPORT").then(|| value.to_string())
        };

        assert!(ObservabilityConfig::from_lookup(lookup("true")).unwrap().enable_metrics_export);
        assert!(ObservabilityConfig::from_lookup(lookup("1")).unwrap().enable_metrics_export);
        assert!(ObservabilityConfig::from_lookup(lookup("YES")).unwrap().enable_metrics_export);
        assert!(!ObservabilityConfig::from_lookup(lookup("off")).unwrap().enable_metrics_export);
        assert!(matches!(
            ObservabilityConfig::from_lookup(lookup("maybe")),
            Err(AppError::Config(_))
        ));

        let unset = ObservabilityConfig::from_lookup(|_: &str| None).unwrap();
        assert_eq!(unset, ObservabilityConfig::default());
    }

    #[test]
    fn test_presets() {
        let dev = presets::development();
        assert!(dev.is_development());
        assert!(!dev.is_production());
        assert!(dev.enable_metrics_export);

        let prod = presets::production();
        assert!(prod.is_production());
        assert!(!prod.use_pretty_logs());

        let minimal = presets::minimal();
        assert_eq!(minimal.log_level, "error");
    }
}
