//! # Diary Analysis
//!
//! End-to-end processing of diary entries: input validation, extraction of
//! ingredient records, and a nutrition report from the configured
//! collaborator. Zero extracted records is an explicit outcome, not an error.

use crate::annotation::LexiconAnnotator;
use crate::config::{AppConfig, NutritionBackend};
use crate::errors::{error_logging, AppError, AppResult};
use crate::ingredient::IngredientRecord;
use crate::nutrition::{NutritionProvider, NutritionReport, NutritionixClient, StaticNutritionTable};
use crate::observability;
use crate::text_processing::FoodExtractor;
use crate::units::UnitTable;
use crate::validation::validate_diary_entry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, Instrument};

/// Analysis result for one diary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryReport {
    pub entry: String,
    pub ingredients: Vec<IngredientRecord>,
    pub nutrition: NutritionReport,
    /// Which collaborator produced the nutrition values ("static" or "remote")
    pub source: String,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiaryOutcome {
    /// The entry contained no usable quantity + food mention
    NoIngredients,
    Report(DiaryReport),
}

/// Shared analyzer combining extraction and nutrition lookup
#[derive(Debug, Clone)]
pub struct DiaryAnalyzer {
    extractor: FoodExtractor,
    nutrition: NutritionProvider,
    max_entry_length: usize,
}

impl DiaryAnalyzer {
    pub fn new(
        extractor: FoodExtractor,
        nutrition: NutritionProvider,
        max_entry_length: usize,
    ) -> Self {
        Self {
            extractor,
            nutrition,
            max_entry_length,
        }
    }

    /// Build an analyzer from application configuration and a loaded unit table
    pub fn from_config(config: &AppConfig, units: UnitTable) -> AppResult<Self> {
        let extractor = FoodExtractor::new(
            Arc::new(LexiconAnnotator::new()),
            Arc::new(units),
            config.extraction.clone(),
        )?;

        let nutrition = match config.nutrition.backend {
            NutritionBackend::Static => {
                NutritionProvider::Static(Arc::new(StaticNutritionTable::with_defaults()))
            }
            NutritionBackend::Remote => {
                NutritionProvider::Remote(Arc::new(NutritionixClient::new(&config.nutrition)?))
            }
        };

        info!(
            backend = nutrition.source_name(),
            max_entry_length = config.max_entry_length,
            "Diary analyzer ready"
        );

        Ok(Self::new(extractor, nutrition, config.max_entry_length))
    }

    pub fn extractor(&self) -> &FoodExtractor {
        &self.extractor
    }

    pub fn max_entry_length(&self) -> usize {
        self.max_entry_length
    }

    /// Validate an entry and extract its ingredient records
    ///
    /// Validation failures carry the localization key ("entry-empty",
    /// "entry-too-long") as their message.
    pub fn extract(&self, entry: &str) -> AppResult<Vec<IngredientRecord>> {
        let trimmed = validate_diary_entry(entry, self.max_entry_length).map_err(|key| {
            error_logging::log_validation_error(&key, "validate_diary_entry", "diary_entry", Some(entry));
            observability::record_error_metrics("validation", "diary");
            AppError::Validation(key.to_string())
        })?;

        let span = observability::extraction_span(trimmed.len());
        Ok(span.in_scope(|| self.extractor.extract(trimmed)))
    }

    /// Analyze one diary entry
    pub async fn analyze(&self, entry: &str) -> AppResult<DiaryOutcome> {
        let records = self.extract(entry)?;
        if records.is_empty() {
            info!("No ingredients found in diary entry");
            return Ok(DiaryOutcome::NoIngredients);
        }

        let nutrition = self.nutrition.report(&records).await?;

        Ok(DiaryOutcome::Report(DiaryReport {
            entry: entry.trim().to_string(),
            ingredients: records,
            nutrition,
            source: self.nutrition.source_name().to_string(),
            analyzed_at: Utc::now(),
        }))
    }

    /// Analyze several entries concurrently; results keep the input order
    pub async fn analyze_batch(self: Arc<Self>, entries: Vec<String>) -> Vec<AppResult<DiaryOutcome>> {
        let handles: Vec<_> = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let analyzer = Arc::clone(&self);
                let span = tracing::info_span!("diary_batch_entry", index = index);
                tokio::spawn(async move { analyzer.analyze(&entry).await }.instrument(span))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(match handle.await {
                Ok(result) => result,
                Err(e) => Err(AppError::Internal(format!("Diary analysis task failed: {}", e))),
            });
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> DiaryAnalyzer {
        DiaryAnalyzer::from_config(&AppConfig::default(), UnitTable::default()).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_static_report() {
        let outcome = analyzer()
            .analyze("I ate 2 cups of rice and 8 oz of chicken.")
            .await
            .unwrap();

        let DiaryOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.ingredients.len(), 2);
        assert_eq!(report.source, "static");
        assert_eq!(report.nutrition.foods.len(), 2);
        assert!(report.nutrition.totals.protein > 0.0);
    }

    #[tokio::test]
    async fn test_no_ingredients_outcome() {
        let outcome = analyzer().analyze("Went for a long walk").await.unwrap();
        assert_eq!(outcome, DiaryOutcome::NoIngredients);
    }

    #[tokio::test]
    async fn test_validation_errors_carry_keys() {
        let err = analyzer().analyze("   ").await.unwrap_err();
        assert_eq!(err, AppError::Validation("entry-empty".to_string()));

        let mut config = AppConfig::default();
        config.max_entry_length = 10;
        let short = DiaryAnalyzer::from_config(&config, UnitTable::default()).unwrap();
        let err = short.analyze("I ate 2 cups of rice").await.unwrap_err();
        assert_eq!(err, AppError::Validation("entry-too-long".to_string()));
    }

    #[tokio::test]
    async fn test_analyze_batch_preserves_order() {
        let analyzer = Arc::new(analyzer());
        let results = analyzer
            .analyze_batch(vec![
                "2 eggs".to_string(),
                "nothing to see".to_string(),
                "".to_string(),
            ])
            .await;

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Ok(DiaryOutcome::Report(_))));
        assert!(matches!(results[1], Ok(DiaryOutcome::NoIngredients)));
        assert!(matches!(results[2], Err(AppError::Validation(_))));
    }
}
