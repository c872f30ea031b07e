//! Nutrition lookup and macro aggregation
//!
//! The extraction core hands a fully materialized list of
//! [`IngredientRecord`]s to one of two collaborators:
//! - `static_table`: a built-in table of per-100g / per-unit profiles matched
//!   with a pluggable [`FoodMatcher`]
//! - `remote`: a natural-language nutrition API queried in one batch

pub mod remote;
pub mod static_table;

pub use remote::NutritionixClient;
pub use static_table::StaticNutritionTable;

use crate::errors::AppResult;
use crate::ingredient::{format_quantity, IngredientRecord};
use crate::observability;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, Instrument};

/// How the values of a [`MacroProfile`] scale with a normalized quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NutritionBasis {
    /// Values per 100 grams; scaled by `normalized_quantity / 100`
    Per100g,
    /// Values per single item; scaled by `normalized_quantity`
    PerUnit,
}

impl NutritionBasis {
    pub fn scale(self, normalized_quantity: f64) -> f64 {
        match self {
            NutritionBasis::Per100g => normalized_quantity / 100.0,
            NutritionBasis::PerUnit => normalized_quantity,
        }
    }
}

/// Macro-nutrient values for one food
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroProfile {
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub sugar: f64,
    pub calories: Option<f64>,
    pub basis: NutritionBasis,
}

impl MacroProfile {
    pub const fn per_100g(carbs: f64, protein: f64, fat: f64, sugar: f64, calories: f64) -> Self {
        Self {
            carbs,
            protein,
            fat,
            sugar,
            calories: Some(calories),
            basis: NutritionBasis::Per100g,
        }
    }

    pub const fn per_unit(carbs: f64, protein: f64, fat: f64, sugar: f64, calories: f64) -> Self {
        Self {
            carbs,
            protein,
            fat,
            sugar,
            calories: Some(calories),
            basis: NutritionBasis::PerUnit,
        }
    }

    /// Fallback for unrecognized foods: contributes nothing to totals
    pub const fn zero() -> Self {
        Self {
            carbs: 0.0,
            protein: 0.0,
            fat: 0.0,
            sugar: 0.0,
            calories: None,
            basis: NutritionBasis::Per100g,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.carbs == 0.0
            && self.protein == 0.0
            && self.fat == 0.0
            && self.sugar == 0.0
            && self.calories.unwrap_or(0.0) == 0.0
    }
}

/// Strategy deciding whether a table entry name matches an extracted food
pub trait FoodMatcher: Send + Sync {
    fn matches(&self, entry_name: &str, food: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// Matches when the entry name occurs anywhere inside the food phrase
/// ("rice" matches "white rice", and also "licorice")
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl FoodMatcher for SubstringMatcher {
    fn matches(&self, entry_name: &str, food: &str) -> bool {
        food.to_lowercase().contains(&entry_name.to_lowercase())
    }

    fn name(&self) -> &'static str {
        "substring"
    }
}

/// Matches only when the whole food phrase equals the entry name
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl FoodMatcher for ExactMatcher {
    fn matches(&self, entry_name: &str, food: &str) -> bool {
        food.trim().eq_ignore_ascii_case(entry_name.trim())
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

/// A synchronous food-name lookup
///
/// Unrecognized names yield [`MacroProfile::zero`] rather than an error.
pub trait NutritionSource: Send + Sync {
    fn lookup(&self, food: &str) -> MacroProfile;
}

/// Nutrition values attributed to one food of an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodNutrition {
    pub food_name: String,
    /// Human-readable amount, e.g. "2 cups" or "120 g"
    pub serving: String,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub sugar: Option<f64>,
}

/// Summed macros across every food of an entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub sugar: f64,
}

impl MacroTotals {
    /// Add one food's values; missing values count as zero
    pub fn add(&mut self, food: &FoodNutrition) {
        self.calories += food.calories.unwrap_or(0.0);
        self.protein += food.protein.unwrap_or(0.0);
        self.carbs += food.carbs.unwrap_or(0.0);
        self.fat += food.fat.unwrap_or(0.0);
        self.sugar += food.sugar.unwrap_or(0.0);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionReport {
    pub foods: Vec<FoodNutrition>,
    pub totals: MacroTotals,
}

impl NutritionReport {
    pub fn from_foods(foods: Vec<FoodNutrition>) -> Self {
        let mut totals = MacroTotals::default();
        for food in &foods {
            totals.add(food);
        }
        Self { foods, totals }
    }
}

fn serving_description(record: &IngredientRecord) -> String {
    if record.is_implicit_unit() {
        format_quantity(record.quantity)
    } else {
        format!("{} {}", format_quantity(record.quantity), record.unit)
    }
}

/// Compute per-food macros and totals from a static source
///
/// Each value is scaled by `normalized_quantity / 100` for per-100g profiles
/// and by `normalized_quantity` for per-unit profiles.
pub fn calculate_macros(records: &[IngredientRecord], source: &dyn NutritionSource) -> NutritionReport {
    let foods = records
        .iter()
        .map(|record| {
            let profile = source.lookup(&record.food);
            let scale = profile.basis.scale(record.normalized_quantity);
            debug!(
                food = %record.food,
                normalized_quantity = record.normalized_quantity,
                basis = ?profile.basis,
                "Scaled nutrition profile"
            );
            FoodNutrition {
                food_name: record.food.clone(),
                serving: serving_description(record),
                calories: profile.calories.map(|c| c * scale),
                protein: Some(profile.protein * scale),
                carbs: Some(profile.carbs * scale),
                fat: Some(profile.fat * scale),
                sugar: Some(profile.sugar * scale),
            }
        })
        .collect();

    NutritionReport::from_foods(foods)
}

/// The nutrition collaborator selected by configuration
#[derive(Clone)]
pub enum NutritionProvider {
    Static(Arc<dyn NutritionSource>),
    Remote(Arc<NutritionixClient>),
}

impl std::fmt::Debug for NutritionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NutritionProvider")
            .field(&self.source_name())
            .finish()
    }
}

impl NutritionProvider {
    pub fn source_name(&self) -> &'static str {
        match self {
            NutritionProvider::Static(_) => "static",
            NutritionProvider::Remote(_) => "remote",
        }
    }

    /// Produce a report for a complete set of records
    ///
    /// Remote failures fail the whole batch; no partial report is returned.
    pub async fn report(&self, records: &[IngredientRecord]) -> AppResult<NutritionReport> {
        let source = self.source_name();
        let span = observability::nutrition_span(source, records.len());
        let start = Instant::now();

        let result = match self {
            NutritionProvider::Static(table) => {
                Ok(span.in_scope(|| calculate_macros(records, table.as_ref())))
            }
            NutritionProvider::Remote(client) => {
                client.fetch_nutrients(records).instrument(span).await
            }
        };

        observability::record_nutrition_lookup_metrics(
            source,
            result.is_ok(),
            start.elapsed(),
            records.len(),
        );
        result
    }
}
