//! Remote nutrition lookup via the Nutritionix natural-language endpoint
//!
//! All records of an entry are sent as a single query such as
//! `"2 cups of rice and 8 oz of chicken"`. A non-success response fails the
//! whole batch.

use super::{FoodNutrition, NutritionReport};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::{NutritionConfig, RecoveryConfig};
use crate::errors::{error_logging, AppError, AppResult};
use crate::ingredient::{format_quantity, IngredientRecord};
use crate::observability;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct NutrientsRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct NutrientsResponse {
    #[serde(default)]
    foods: Vec<NutritionixFood>,
}

/// One food entry of a nutrients response
#[derive(Debug, Clone, Deserialize)]
pub struct NutritionixFood {
    pub food_name: String,
    pub serving_qty: Option<f64>,
    pub serving_unit: Option<String>,
    pub nf_calories: Option<f64>,
    pub nf_protein: Option<f64>,
    pub nf_total_carbohydrate: Option<f64>,
    pub nf_total_fat: Option<f64>,
    pub nf_sugars: Option<f64>,
}

impl From<NutritionixFood> for FoodNutrition {
    fn from(food: NutritionixFood) -> Self {
        let serving = match (food.serving_qty, food.serving_unit.as_deref()) {
            (Some(qty), Some(unit)) => format!("{} {}", format_quantity(qty), unit),
            (Some(qty), None) => format_quantity(qty),
            (None, Some(unit)) => unit.to_string(),
            (None, None) => String::new(),
        };
        FoodNutrition {
            food_name: food.food_name,
            serving,
            calories: food.nf_calories,
            protein: food.nf_protein,
            carbs: food.nf_total_carbohydrate,
            fat: food.nf_total_fat,
            sugar: food.nf_sugars,
        }
    }
}

/// Failure of a single attempt, tagged with whether a retry may help
struct AttemptError {
    error: AppError,
    retryable: bool,
}

/// HTTP client for the natural-language nutrients endpoint
pub struct NutritionixClient {
    client: reqwest::Client,
    api_url: String,
    app_id: String,
    api_key: String,
    recovery: RecoveryConfig,
    circuit_breaker: CircuitBreaker,
}

impl std::fmt::Debug for NutritionixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NutritionixClient")
            .field("api_url", &self.api_url)
            .field("app_id", &self.app_id)
            .field("api_key", &"[REDACTED]")
            .field("recovery", &self.recovery)
            .finish()
    }
}

impl NutritionixClient {
    /// Build a client; credentials must be present
    pub fn new(config: &NutritionConfig) -> AppResult<Self> {
        let app_id = config
            .app_id
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("NUTRITIONIX_APP_ID is not set".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("NUTRITIONIX_API_KEY is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            app_id,
            api_key,
            recovery: config.recovery.clone(),
            circuit_breaker: CircuitBreaker::new(config.recovery.clone()),
        })
    }

    /// Join record phrases into one natural-language query
    pub fn build_query(records: &[IngredientRecord]) -> String {
        records
            .iter()
            .map(IngredientRecord::query_phrase)
            .collect::<Vec<_>>()
            .join(" and ")
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Fetch nutrition for every record in one request, retrying transient failures
    pub async fn fetch_nutrients(&self, records: &[IngredientRecord]) -> AppResult<NutritionReport> {
        if records.is_empty() {
            return Ok(NutritionReport::default());
        }

        if self.circuit_breaker.is_open() {
            observability::update_circuit_breaker_state(true);
            let err = AppError::Network(
                "Nutrition API circuit breaker is open; skipping request".to_string(),
            );
            observability::record_error_metrics("circuit_open", "nutrition_api");
            return Err(err);
        }

        let query = Self::build_query(records);
        let max_attempts = self.recovery.max_retries + 1;
        let start = Instant::now();
        let mut attempt = 0;

        info!(ingredient_count = records.len(), "Querying nutrition API");
        debug!(query = %query, "Nutrition API query");

        loop {
            attempt += 1;
            match self.send_once(&query).await {
                Ok(foods) => {
                    self.circuit_breaker.record_success();
                    observability::update_circuit_breaker_state(false);
                    info!(
                        attempt = attempt,
                        food_count = foods.len(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Nutrition API request succeeded"
                    );
                    return Ok(NutritionReport::from_foods(
                        foods.into_iter().map(FoodNutrition::from).collect(),
                    ));
                }
                Err(AttemptError { error, retryable }) => {
                    if !retryable || attempt >= max_attempts {
                        self.circuit_breaker.record_failure();
                        observability::update_circuit_breaker_state(self.circuit_breaker.is_open());
                        observability::record_error_metrics("network", "nutrition_api");
                        error_logging::log_network_error(
                            &error,
                            "fetch_nutrients",
                            Some(&self.api_url),
                            Some(attempt),
                        );
                        error_logging::log_lookup_error(
                            &error,
                            "fetch_nutrients",
                            Some(records.len()),
                            Some(start.elapsed()),
                        );
                        return Err(error);
                    }

                    let delay_ms = calculate_retry_delay(attempt, &self.recovery);
                    observability::record_retry("fetch_nutrients", attempt);
                    warn!("Nutrition API attempt {attempt} failed: {error}. Retrying in {delay_ms}ms");
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn send_once(&self, query: &str) -> Result<Vec<NutritionixFood>, AttemptError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-app-id", &self.app_id)
            .header("x-app-key", &self.api_key)
            .json(&NutrientsRequest { query })
            .send()
            .await
            .map_err(|e| AttemptError {
                error: AppError::from(e),
                retryable: true,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError {
                error: AppError::Network(format!(
                    "Nutrition API returned {}: {}",
                    status.as_u16(),
                    body.trim()
                )),
                retryable: status.is_server_error(),
            });
        }

        let body = response.text().await.map_err(|e| AttemptError {
            error: AppError::from(e),
            retryable: true,
        })?;

        let parsed: NutrientsResponse = serde_json::from_str(&body).map_err(|e| AttemptError {
            error: AppError::from(e),
            retryable: false,
        })?;

        Ok(parsed.foods)
    }
}

/// Exponential backoff with up to 25% random jitter, capped at the max delay
pub fn calculate_retry_delay(attempt: u32, recovery: &RecoveryConfig) -> u64 {
    let exponent = attempt.saturating_sub(1).min(31);
    let delay = recovery
        .base_retry_delay_ms
        .saturating_mul(1u64 << exponent)
        .min(recovery.max_retry_delay_ms);

    let jitter_range = delay / 4;
    if jitter_range == 0 {
        return delay;
    }
    delay + rand::random::<u64>() % jitter_range
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient::assemble;

    fn remote_config() -> NutritionConfig {
        NutritionConfig {
            app_id: Some("app".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_query() {
        let records = vec![
            assemble(2.0, "cups", 240.0, "rice").unwrap(),
            assemble(8.0, "oz", 28.35, "chicken").unwrap(),
            assemble(3.0, "unit", 1.0, "eggs").unwrap(),
        ];
        assert_eq!(
            NutritionixClient::build_query(&records),
            "2 cups of rice and 8 oz of chicken and 3 eggs"
        );
    }

    #[test]
    fn test_new_requires_credentials() {
        assert!(NutritionixClient::new(&NutritionConfig::default()).is_err());
        assert!(NutritionixClient::new(&remote_config()).is_ok());
    }

    #[test]
    fn test_retry_delay_growth_and_cap() {
        let recovery = RecoveryConfig {
            base_retry_delay_ms: 100,
            max_retry_delay_ms: 300,
            ..Default::default()
        };
        let first = calculate_retry_delay(1, &recovery);
        assert!((100..125).contains(&first));
        let second = calculate_retry_delay(2, &recovery);
        assert!((200..250).contains(&second));
        let capped = calculate_retry_delay(10, &recovery);
        assert!((300..375).contains(&capped));
    }

    #[test]
    fn test_retry_delay_small_base_has_no_jitter() {
        let recovery = RecoveryConfig {
            base_retry_delay_ms: 2,
            max_retry_delay_ms: 2,
            ..Default::default()
        };
        assert_eq!(calculate_retry_delay(1, &recovery), 2);
    }

    #[test]
    fn test_food_conversion_with_nulls() {
        let food: NutritionixFood = serde_json::from_str(
            r#"{"food_name":"rice","serving_qty":2,"serving_unit":"cup","nf_calories":410.8,"nf_protein":null}"#,
        )
        .unwrap();
        let nutrition = FoodNutrition::from(food);
        assert_eq!(nutrition.serving, "2 cup");
        assert_eq!(nutrition.calories, Some(410.8));
        assert_eq!(nutrition.protein, None);
        assert_eq!(nutrition.sugar, None);
    }

    #[tokio::test]
    async fn test_empty_records_skip_request() {
        let client = NutritionixClient::new(&remote_config()).unwrap();
        let report = client.fetch_nutrients(&[]).await.unwrap();
        assert!(report.foods.is_empty());
    }
}
