//! Built-in nutrition table
//!
//! Entries are checked in insertion order and the first match wins, so more
//! specific names ("peanut butter") must come before broader ones.

use super::{FoodMatcher, MacroProfile, NutritionSource, SubstringMatcher};
use tracing::{debug, trace};

/// In-memory nutrition table keyed by food name
#[derive(Debug, Clone)]
pub struct StaticNutritionTable<M: FoodMatcher = SubstringMatcher> {
    entries: Vec<(String, MacroProfile)>,
    matcher: M,
}

impl StaticNutritionTable<SubstringMatcher> {
    /// Default table with substring matching
    pub fn with_defaults() -> Self {
        Self::seeded(SubstringMatcher)
    }
}

impl Default for StaticNutritionTable<SubstringMatcher> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<M: FoodMatcher> StaticNutritionTable<M> {
    /// Empty table using the given matching strategy
    pub fn new(matcher: M) -> Self {
        Self {
            entries: Vec::new(),
            matcher,
        }
    }

    /// Built-in entries using the given matching strategy
    pub fn seeded(matcher: M) -> Self {
        let mut table = Self::new(matcher);
        // (carbs, protein, fat, sugar, kcal)
        table.insert("peanut butter", MacroProfile::per_100g(20.0, 25.0, 50.0, 9.0, 588.0));
        table.insert("oatmeal", MacroProfile::per_100g(12.0, 2.5, 1.5, 0.5, 71.0));
        table.insert("banana", MacroProfile::per_100g(23.0, 1.1, 0.3, 12.0, 89.0));
        table.insert("honey", MacroProfile::per_100g(82.0, 0.3, 0.0, 82.0, 304.0));
        table.insert("bread", MacroProfile::per_100g(49.0, 9.0, 3.2, 5.0, 265.0));
        table.insert("turkey", MacroProfile::per_100g(0.0, 29.0, 7.0, 0.0, 189.0));
        table.insert("rice", MacroProfile::per_100g(28.0, 2.7, 0.3, 0.1, 130.0));
        table.insert("chicken", MacroProfile::per_100g(0.0, 31.0, 3.6, 0.0, 165.0));
        table.insert("apple", MacroProfile::per_100g(14.0, 0.3, 0.2, 10.0, 52.0));
        table.insert("milk", MacroProfile::per_100g(5.0, 3.4, 3.6, 5.0, 61.0));
        table.insert("egg", MacroProfile::per_unit(0.6, 6.3, 5.3, 0.6, 78.0));
        table
    }

    /// Append an entry; earlier entries take precedence on lookup
    pub fn insert(&mut self, name: impl Into<String>, profile: MacroProfile) {
        self.entries.push((name.into().to_lowercase(), profile));
    }

    /// First entry whose name matches the food, if any
    pub fn find(&self, food: &str) -> Option<(&str, &MacroProfile)> {
        self.entries
            .iter()
            .find(|(name, _)| self.matcher.matches(name, food))
            .map(|(name, profile)| (name.as_str(), profile))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M: FoodMatcher> NutritionSource for StaticNutritionTable<M> {
    fn lookup(&self, food: &str) -> MacroProfile {
        match self.find(food) {
            Some((name, profile)) => {
                trace!(food = %food, entry = %name, matcher = self.matcher.name(), "Nutrition entry matched");
                *profile
            }
            None => {
                debug!(food = %food, matcher = self.matcher.name(), "No nutrition entry, using zero profile");
                MacroProfile::zero()
            }
        }
    }
}
