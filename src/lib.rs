//! # Food Diary
//!
//! Extracts quantity, unit and food mentions from free-text diary entries
//! ("2 cups of rice and 8 oz of chicken") and estimates macro-nutrient totals
//! from a built-in table or a remote nutrition API.

pub mod annotation;
pub mod circuit_breaker;
pub mod config;
pub mod diary;
pub mod errors;
pub mod ingredient;
pub mod localization;
pub mod nutrition;
pub mod observability;
pub mod observability_config;
pub mod quantity;
pub mod report;
pub mod text_processing;
pub mod units;
pub mod validation;

// Re-export types for easier access
pub use diary::{DiaryAnalyzer, DiaryOutcome, DiaryReport};
pub use ingredient::IngredientRecord;
pub use text_processing::{ExtractionConfig, FoodExtractor};
pub use units::UnitTable;
