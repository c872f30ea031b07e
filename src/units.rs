//! # Unit Table
//!
//! Static mapping from unit surface forms (singular, plural, abbreviations)
//! to a normalization factor in grams-equivalent, or 1 for count units.
//!
//! The table is loaded once at startup from `config/measurement_units.json`
//! and shared read-only. Lookups are case-insensitive exact matches; there is
//! no fuzzy matching.

use crate::errors::{AppError, AppResult};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use tracing::{debug, info, warn};

/// Unit recorded when no unit token follows a quantity
pub const COUNT_UNIT: &str = "unit";

/// Factor of the implicit count unit
pub const COUNT_UNIT_FACTOR: f64 = 1.0;

/// Copy of the default configuration compiled into the binary
pub const EMBEDDED_UNITS_CONFIG: &str = include_str!("../config/measurement_units.json");

/// Category of a measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    /// Mass units normalized to grams
    Weight,
    /// Volume units normalized to grams-equivalent (water density)
    Volume,
    /// Discrete items (piece, slice)
    Count,
}

/// Normalization entry for one unit surface form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSpec {
    pub factor: f64,
    pub category: UnitCategory,
}

/// Measurement units configuration loaded from JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeasurementUnitsConfig {
    pub measurement_units: MeasurementUnits,
    /// Nouns that follow numbers but never name a food ("3 times", "2 hours")
    #[serde(default)]
    pub non_food_words: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeasurementUnits {
    pub weight_units: BTreeMap<String, f64>,
    pub volume_units: BTreeMap<String, f64>,
    pub count_units: BTreeMap<String, f64>,
}

impl MeasurementUnits {
    fn categories(&self) -> [(&'static str, UnitCategory, &BTreeMap<String, f64>); 3] {
        [
            ("weight_units", UnitCategory::Weight, &self.weight_units),
            ("volume_units", UnitCategory::Volume, &self.volume_units),
            ("count_units", UnitCategory::Count, &self.count_units),
        ]
    }
}

impl MeasurementUnitsConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(content: &str) -> AppResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| AppError::Config(format!("invalid measurement units config: {}", e)))
    }

    /// The configuration compiled into the binary
    pub fn embedded() -> AppResult<Self> {
        Self::from_json(EMBEDDED_UNITS_CONFIG)
    }

    /// Validate measurement units configuration
    pub fn validate(&self) -> AppResult<()> {
        let mut seen: HashSet<String> = HashSet::new();

        for (category, _, units) in self.measurement_units.categories() {
            if units.is_empty() {
                return Err(AppError::Config(format!("{} cannot be empty", category)));
            }

            for (unit, factor) in units {
                if unit.trim().is_empty() {
                    return Err(AppError::Config(format!(
                        "{} contains an empty unit name",
                        category
                    )));
                }
                if unit.chars().any(|c| c.is_control()) {
                    return Err(AppError::Config(format!(
                        "{} unit '{}' contains control characters",
                        category, unit
                    )));
                }
                if !factor.is_finite() || *factor <= 0.0 {
                    return Err(AppError::Config(format!(
                        "{} unit '{}' has invalid factor {}",
                        category, unit, factor
                    )));
                }
                if !seen.insert(unit.trim().to_lowercase()) {
                    return Err(AppError::Config(format!(
                        "unit '{}' is defined more than once",
                        unit
                    )));
                }
            }
        }

        for (i, word) in self.non_food_words.iter().enumerate() {
            if word.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "non_food_words[{}] cannot be empty",
                    i
                )));
            }
        }

        Ok(())
    }
}

fn read_config_file(path: &str) -> Option<MeasurementUnitsConfig> {
    match fs::read_to_string(path) {
        Ok(content) => match MeasurementUnitsConfig::from_json(&content) {
            Ok(config) => match config.validate() {
                Ok(()) => Some(config),
                Err(e) => {
                    warn!(path = %path, error = %e, "Invalid measurement units config");
                    None
                }
            },
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to parse measurement units config");
                None
            }
        },
        Err(e) => {
            debug!(path = %path, error = %e, "Measurement units config not readable");
            None
        }
    }
}

/// Load measurement units configuration
///
/// Resolution order: `MEASUREMENT_UNITS_CONFIG_PATH`, the Docker and local
/// development paths, then the configuration embedded in the binary.
pub fn load_measurement_units_config() -> AppResult<MeasurementUnitsConfig> {
    if let Ok(config_path) = std::env::var("MEASUREMENT_UNITS_CONFIG_PATH") {
        info!(
            "Loading measurement units config from environment variable: {}",
            config_path
        );
        if let Some(config) = read_config_file(&config_path) {
            return Ok(config);
        }
        warn!(
            "Falling back to default paths after failing to load '{}'",
            config_path
        );
    }

    let possible_paths = [
        "/app/config/measurement_units.json", // Docker path
        "config/measurement_units.json",      // Local development path
        "../config/measurement_units.json",   // Test path
    ];

    for config_path in &possible_paths {
        if let Some(config) = read_config_file(config_path) {
            info!(
                "Successfully loaded measurement units config from fallback path: {}",
                config_path
            );
            return Ok(config);
        }
    }

    info!("No measurement units config file found, using embedded defaults");
    MeasurementUnitsConfig::embedded()
}

lazy_static! {
    static ref EMBEDDED_TABLE: UnitTable = MeasurementUnitsConfig::embedded()
        .and_then(|config| UnitTable::from_config(&config))
        .expect("Embedded measurement units config should be valid");
}

/// Case-insensitive unit lookup table
#[derive(Debug, Clone)]
pub struct UnitTable {
    units: HashMap<String, UnitSpec>,
    non_food_words: HashSet<String>,
}

impl Default for UnitTable {
    fn default() -> Self {
        EMBEDDED_TABLE.clone()
    }
}

impl UnitTable {
    /// Build a table from a validated configuration
    pub fn from_config(config: &MeasurementUnitsConfig) -> AppResult<Self> {
        config.validate()?;

        let mut units = HashMap::new();
        for (_, category, entries) in config.measurement_units.categories() {
            for (unit, factor) in entries {
                units.insert(
                    unit.trim().to_lowercase(),
                    UnitSpec {
                        factor: *factor,
                        category,
                    },
                );
            }
        }

        let non_food_words = config
            .non_food_words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .collect();

        debug!(unit_count = units.len(), "Built unit table");
        Ok(Self {
            units,
            non_food_words,
        })
    }

    /// Load the configuration from disk (or the embedded copy) and build the table
    pub fn load() -> AppResult<Self> {
        let config = load_measurement_units_config()?;
        Self::from_config(&config)
    }

    /// Normalization factor for a unit surface form
    pub fn normalize(&self, unit: &str) -> Option<f64> {
        self.lookup(unit).map(|spec| spec.factor)
    }

    pub fn lookup(&self, unit: &str) -> Option<UnitSpec> {
        self.units.get(&unit.trim().to_lowercase()).copied()
    }

    pub fn category(&self, unit: &str) -> Option<UnitCategory> {
        self.lookup(unit).map(|spec| spec.category)
    }

    pub fn is_unit(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }

    /// Whether a word is known to follow numbers without naming a food
    pub fn is_non_food_word(&self, word: &str) -> bool {
        self.non_food_words.contains(&word.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
