//! # Ingredient Records
//!
//! The structured output of the extraction core: one record per resolved
//! quantity + food mention. Records are plain values with no reference back
//! to the tokens they were built from.

use crate::units::COUNT_UNIT;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One quantity + unit + food mention extracted from a diary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub quantity: f64,
    /// Lowercase unit surface form, or `"unit"` when no unit was written
    pub unit: String,
    pub unit_factor: f64,
    /// `quantity * unit_factor`
    pub normalized_quantity: f64,
    /// Lowercase food phrase, never empty
    pub food: String,
}

impl IngredientRecord {
    /// Whether the unit is the implicit count unit
    pub fn is_implicit_unit(&self) -> bool {
        self.unit == COUNT_UNIT
    }

    /// Natural-language phrase for a nutrition API query, e.g. "2 cups of rice"
    pub fn query_phrase(&self) -> String {
        if self.is_implicit_unit() {
            format!("{} {}", format_quantity(self.quantity), self.food)
        } else {
            format!(
                "{} {} of {}",
                format_quantity(self.quantity),
                self.unit,
                self.food
            )
        }
    }
}

impl fmt::Display for IngredientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (normalized: {})",
            self.query_phrase(),
            format_quantity(self.normalized_quantity)
        )
    }
}

/// Format a quantity without a trailing ".0" for whole numbers
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let formatted = format!("{:.3}", value);
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Combine a resolved quantity, unit and food phrase into a record
///
/// Returns `None` when the food phrase is blank or the numeric inputs are
/// not positive; the extractor's token-level rejection gate runs before this.
pub fn assemble(quantity: f64, unit: &str, unit_factor: f64, food: &str) -> Option<IngredientRecord> {
    let food = food.trim();
    if food.is_empty() || !food.chars().any(char::is_alphabetic) {
        return None;
    }
    if !(quantity.is_finite() && quantity > 0.0 && unit_factor.is_finite() && unit_factor > 0.0) {
        return None;
    }

    Some(IngredientRecord {
        quantity,
        unit: unit.to_lowercase(),
        unit_factor,
        normalized_quantity: quantity * unit_factor,
        food: food.to_lowercase(),
    })
}
