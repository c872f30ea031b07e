//! # Unified Application Configuration
//!
//! This module consolidates all settings for the food diary into a single
//! structured configuration object loaded from environment variables (a
//! `.env` file is honoured by the binary), with validation per section.

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use crate::text_processing::ExtractionConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Default Nutritionix natural-language endpoint
pub const DEFAULT_NUTRITION_API_URL: &str = "https://trackapi.nutritionix.com/v2/natural/nutrients";

/// Which nutrition collaborator answers lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutritionBackend {
    /// Built-in per-100g table with substring matching
    Static,
    /// Remote natural-language nutrition API
    Remote,
}

impl FromStr for NutritionBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" | "table" => Ok(NutritionBackend::Static),
            "remote" | "nutritionix" | "api" => Ok(NutritionBackend::Remote),
            other => Err(AppError::Config(format!(
                "NUTRITION_BACKEND must be 'static' or 'remote', got '{}'",
                other
            ))),
        }
    }
}

/// Retry and circuit breaker settings for the nutrition API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts after the first request
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_retry_delay_ms: 500,
            max_retry_delay_ms: 5000,
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

impl RecoveryConfig {
    /// Validate recovery configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.base_retry_delay_ms == 0 {
            return Err(AppError::Config(
                "base_retry_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_retry_delay_ms < self.base_retry_delay_ms {
            return Err(AppError::Config(format!(
                "max_retry_delay_ms ({}) must be >= base_retry_delay_ms ({})",
                self.max_retry_delay_ms, self.base_retry_delay_ms
            )));
        }
        if self.circuit_breaker_threshold == 0 {
            return Err(AppError::Config(
                "circuit_breaker_threshold must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Nutrition lookup configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionConfig {
    pub backend: NutritionBackend,
    /// Natural-language nutrients endpoint
    pub api_url: String,
    /// Application id sent as `x-app-id`
    pub app_id: Option<String>,
    /// Application key sent as `x-app-key`
    pub api_key: Option<String>,
    /// HTTP client timeout in seconds
    pub http_timeout_secs: u64,
    pub recovery: RecoveryConfig,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            backend: NutritionBackend::Static,
            api_url: DEFAULT_NUTRITION_API_URL.to_string(),
            app_id: None,
            api_key: None,
            http_timeout_secs: 30,
            recovery: RecoveryConfig::default(),
        }
    }
}

impl NutritionConfig {
    /// Validate nutrition configuration
    pub fn validate(&self) -> AppResult<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "Nutrition API URL must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }

        if self.http_timeout_secs == 0 {
            return Err(AppError::Config("HTTP timeout cannot be 0".to_string()));
        }

        if self.http_timeout_secs > 300 {
            return Err(AppError::Config(
                "HTTP timeout cannot be greater than 300 seconds".to_string(),
            ));
        }

        if self.backend == NutritionBackend::Remote {
            let missing = |value: &Option<String>| {
                value.as_deref().map(str::trim).unwrap_or("").is_empty()
            };
            if missing(&self.app_id) {
                return Err(AppError::Config(
                    "NUTRITIONIX_APP_ID is required for the remote nutrition backend".to_string(),
                ));
            }
            if missing(&self.api_key) {
                return Err(AppError::Config(
                    "NUTRITIONIX_API_KEY is required for the remote nutrition backend"
                        .to_string(),
                ));
            }
        }

        self.recovery.validate()
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Nutrition lookup configuration
    pub nutrition: NutritionConfig,
    /// Extraction configuration
    pub extraction: ExtractionConfig,
    /// Observability configuration
    pub observability: ObservabilityConfig,
    /// Language for user-facing messages ("en", "fr")
    pub language: String,
    /// Maximum accepted diary entry length in characters
    pub max_entry_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nutrition: NutritionConfig::default(),
            extraction: ExtractionConfig::default(),
            observability: ObservabilityConfig::default(),
            language: "en".to_string(),
            max_entry_length: 2000,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> AppResult<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a valid number", key))),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        config.observability = ObservabilityConfig::from_env()?;
        Ok(config)
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Observability settings keep their defaults; `from_env` fills them in.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(backend) = lookup("NUTRITION_BACKEND") {
            config.nutrition.backend = backend.parse()?;
        }
        if let Some(url) = lookup("NUTRITIONIX_API_URL") {
            config.nutrition.api_url = url;
        }
        config.nutrition.app_id = lookup("NUTRITIONIX_APP_ID");
        config.nutrition.api_key = lookup("NUTRITIONIX_API_KEY");
        config.nutrition.http_timeout_secs =
            parse_var(&lookup, "HTTP_CLIENT_TIMEOUT_SECS", config.nutrition.http_timeout_secs)?;
        config.nutrition.recovery.max_retries = parse_var(
            &lookup,
            "NUTRITION_API_MAX_RETRIES",
            config.nutrition.recovery.max_retries,
        )?;

        config.extraction.unit_window =
            parse_var(&lookup, "UNIT_SCAN_WINDOW", config.extraction.unit_window)?;
        config.extraction.max_food_words =
            parse_var(&lookup, "MAX_FOOD_WORDS", config.extraction.max_food_words)?;

        if let Some(language) = lookup("DIARY_LANGUAGE") {
            config.language = language;
        }
        config.max_entry_length =
            parse_var(&lookup, "MAX_ENTRY_LENGTH", config.max_entry_length)?;

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.nutrition.validate()?;
        self.extraction.validate()?;
        self.observability.validate()?;

        if self.language.trim().is_empty() {
            return Err(AppError::Config("DIARY_LANGUAGE cannot be empty".to_string()));
        }
        if self.max_entry_length == 0 {
            return Err(AppError::Config(
                "MAX_ENTRY_LENGTH must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: backend={:?}, api_url={}, api_key=[REDACTED], unit_window={}, language={}, metrics_export={}",
            self.nutrition.backend,
            self.nutrition.api_url,
            self.extraction.unit_window,
            self.language,
            self.observability.enable_metrics_export
        )
    }
}
