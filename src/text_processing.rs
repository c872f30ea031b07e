//! # Text Processing Module
//!
//! Quantity–unit–food extraction over annotated diary text.
//!
//! ## Features
//!
//! - Quantity resolution for integers, decimals, fractions and mixed numbers ("2 1/2")
//! - Bounded forward scan for a unit, falling back to the implicit count unit
//! - Food phrase snapping to noun-chunk boundaries, so compounds such as
//!   "peanut butter" stay whole
//! - Rejection of false-positive numbers ("I called him 3 times")
//!
//! ## Processing Flow
//!
//! ```text
//! For each numeric token, left to right:
//!   START    -> resolve quantity          (parse failure: drop candidate)
//!   QUANTITY -> scan for unit             (always succeeds, count unit fallback)
//!   UNIT     -> resolve food span         (empty / stop-word-only: drop candidate)
//!   FOOD     -> assemble record, back to START
//! ```
//!
//! Each candidate owns the tokens between its quantity and the next numeric
//! token. Unit scans and food spans never leave that region, so two adjacent
//! mentions can never claim the same tokens.

use crate::annotation::{Annotation, Annotator, LexiconAnnotator, Token};
use crate::errors::{AppError, AppResult};
use crate::ingredient::{assemble, IngredientRecord};
use crate::quantity::{is_fraction_literal, is_integer_literal, parse_quantity};
use crate::units::{UnitTable, COUNT_UNIT, COUNT_UNIT_FACTOR};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Filler word skipped between a unit and its food ("2 cups of rice")
const FILLER_WORD: &str = "of";

/// Configuration options for food extraction
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionConfig {
    /// How many tokens after a quantity are searched for a unit
    pub unit_window: usize,
    /// Maximum number of tokens kept in a food phrase
    pub max_food_words: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            unit_window: 3,
            max_food_words: 6,
        }
    }
}

impl ExtractionConfig {
    /// Validate extraction configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.unit_window == 0 || self.unit_window > 4 {
            return Err(AppError::Config(format!(
                "unit_window must be between 1 and 4, got {}",
                self.unit_window
            )));
        }

        if self.max_food_words == 0 {
            return Err(AppError::Config(
                "max_food_words must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Quantity resolved from one or two numeric tokens
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResolvedQuantity {
    value: f64,
    /// Index of the last token that is part of the quantity
    last_index: usize,
}

/// Unit resolved by the forward scan
#[derive(Debug, Clone, PartialEq)]
struct ResolvedUnit {
    unit: String,
    factor: f64,
    /// Index of the unit token, `None` for the implicit count unit
    token_index: Option<usize>,
}

/// Extracts ingredient records from free-text diary entries
///
/// The annotator and unit table are long-lived shared handles; the extractor
/// itself holds no mutable state, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct FoodExtractor {
    annotator: Arc<dyn Annotator>,
    units: Arc<UnitTable>,
    config: ExtractionConfig,
}

impl std::fmt::Debug for FoodExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodExtractor")
            .field("units", &self.units.len())
            .field("config", &self.config)
            .finish()
    }
}

impl FoodExtractor {
    /// Create an extractor from explicit collaborators
    ///
    /// # Examples
    ///
    /// ```rust
    /// use food_diary::annotation::LexiconAnnotator;
    /// use food_diary::text_processing::{ExtractionConfig, FoodExtractor};
    /// use food_diary::units::UnitTable;
    /// use std::sync::Arc;
    ///
    /// let extractor = FoodExtractor::new(
    ///     Arc::new(LexiconAnnotator::new()),
    ///     Arc::new(UnitTable::default()),
    ///     ExtractionConfig::default(),
    /// )?;
    /// let records = extractor.extract("I ate 2 cups of rice");
    /// assert_eq!(records[0].food, "rice");
    /// # Ok::<(), food_diary::errors::AppError>(())
    /// ```
    pub fn new(
        annotator: Arc<dyn Annotator>,
        units: Arc<UnitTable>,
        config: ExtractionConfig,
    ) -> AppResult<Self> {
        config.validate()?;
        info!(
            unit_count = units.len(),
            unit_window = config.unit_window,
            max_food_words = config.max_food_words,
            "Creating FoodExtractor"
        );
        Ok(Self {
            annotator,
            units,
            config,
        })
    }

    /// Extractor with the lexicon annotator, embedded unit table and default config
    pub fn with_defaults() -> Self {
        Self {
            annotator: Arc::new(LexiconAnnotator::new()),
            units: Arc::new(UnitTable::default()),
            config: ExtractionConfig::default(),
        }
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract all ingredient records from one diary entry, in order of appearance
    pub fn extract(&self, text: &str) -> Vec<IngredientRecord> {
        let annotation = self.annotator.annotate(text);
        self.extract_from_annotation(&annotation)
    }

    /// Run the extraction state machine over an existing annotation
    pub fn extract_from_annotation(&self, annotation: &Annotation) -> Vec<IngredientRecord> {
        let start_time = std::time::Instant::now();
        let tokens = &annotation.tokens;

        let mut records = Vec::new();
        let mut candidates = 0;
        let mut rejected = 0;
        let mut index = 0;

        'candidate_loop: while index < tokens.len() {
            if !tokens[index].like_num {
                index += 1;
                continue;
            }
            candidates += 1;

            // START -> QUANTITY
            let Some(quantity) = self.resolve_quantity(tokens, index) else {
                debug!(token = %tokens[index].text, "Skipping unparseable quantity");
                rejected += 1;
                index += 1;
                continue 'candidate_loop;
            };
            let region_start = quantity.last_index + 1;
            let region_end = next_numeric_index(tokens, region_start);

            // QUANTITY -> UNIT
            let unit = self.resolve_unit(tokens, region_start, region_end);
            let food_start = unit
                .token_index
                .map(|i| i + 1)
                .unwrap_or(region_start);

            // UNIT -> FOOD
            let Some((span_start, span_end)) =
                self.resolve_food_span(annotation, food_start, region_end)
            else {
                debug!(
                    quantity = quantity.value,
                    unit = %unit.unit,
                    "Rejecting candidate without a food phrase"
                );
                rejected += 1;
                index = region_end;
                continue 'candidate_loop;
            };

            // FOOD -> record
            let food = annotation.span_text(span_start, span_end);
            match assemble(quantity.value, &unit.unit, unit.factor, &food) {
                Some(record) => {
                    trace!(
                        quantity = record.quantity,
                        unit = %record.unit,
                        food = %record.food,
                        "Assembled ingredient record"
                    );
                    records.push(record);
                }
                None => {
                    debug!(food = %food, "Assembler rejected candidate");
                    rejected += 1;
                }
            }

            index = region_end;
        }

        crate::observability::record_extraction_metrics(
            start_time.elapsed(),
            tokens.len(),
            candidates,
            records.len(),
            rejected,
        );

        info!(
            candidates = candidates,
            records = records.len(),
            rejected = rejected,
            "Extracted ingredient records"
        );
        records
    }

    /// Resolve the quantity at `index`, joining "2 1/2" style mixed numbers
    fn resolve_quantity(&self, tokens: &[Token], index: usize) -> Option<ResolvedQuantity> {
        let literal = &tokens[index].text;
        let value = parse_quantity(literal)?;

        if is_integer_literal(literal) {
            if let Some(next) = tokens.get(index + 1) {
                if next.like_num && is_fraction_literal(&next.text) {
                    if let Some(fraction) = parse_quantity(&next.text).filter(|f| *f < 1.0) {
                        return Some(ResolvedQuantity {
                            value: value + fraction,
                            last_index: index + 1,
                        });
                    }
                }
            }
        }

        Some(ResolvedQuantity {
            value,
            last_index: index,
        })
    }

    /// Scan up to `unit_window` tokens for a known unit; the closest match wins
    fn resolve_unit(&self, tokens: &[Token], start: usize, region_end: usize) -> ResolvedUnit {
        let window_end = (start + self.config.unit_window).min(region_end);

        for (i, token) in tokens.iter().enumerate().take(window_end).skip(start) {
            let lower = token.lower();
            if let Some(factor) = self.units.normalize(&lower) {
                return ResolvedUnit {
                    unit: lower,
                    factor,
                    token_index: Some(i),
                };
            }
        }

        ResolvedUnit {
            unit: COUNT_UNIT.to_string(),
            factor: COUNT_UNIT_FACTOR,
            token_index: None,
        }
    }

    /// Determine the `[start, end)` token range of the food phrase
    fn resolve_food_span(
        &self,
        annotation: &Annotation,
        start: usize,
        region_end: usize,
    ) -> Option<(usize, usize)> {
        let tokens = &annotation.tokens;

        let mut pos = start;
        while pos < region_end && (tokens[pos].is_stop || tokens[pos].lower() == FILLER_WORD) {
            pos += 1;
        }
        if pos >= region_end {
            return None;
        }

        let (span_start, span_end) = self
            .chunk_span(annotation, pos, region_end)
            .unwrap_or((pos, pos + 1));
        let span_end = span_end.min(span_start + self.config.max_food_words);

        if tokens[span_start..span_end]
            .iter()
            .any(|token| self.is_food_word(token))
        {
            Some((span_start, span_end))
        } else {
            None
        }
    }

    /// Noun-chunk boundaries for the food phrase starting at or after `pos`
    ///
    /// A chunk covering `pos` is clipped to start there ("cup oatmeal" ->
    /// "oatmeal"); otherwise the first chunk starting inside the region wins.
    /// Chunks whose first word is a unit are never taken.
    fn chunk_span(&self, annotation: &Annotation, pos: usize, region_end: usize) -> Option<(usize, usize)> {
        let tokens = &annotation.tokens;
        let starts_with_unit = |i: usize| self.units.is_unit(&tokens[i].lower());

        if let Some(chunk) = annotation.chunk_containing(pos) {
            if !starts_with_unit(pos) {
                return Some((pos, chunk.end.min(region_end)));
            }
        }

        annotation
            .noun_chunks
            .iter()
            .find(|chunk| chunk.start > pos && chunk.start < region_end && !starts_with_unit(chunk.start))
            .map(|chunk| (chunk.start, chunk.end.min(region_end)))
    }

    /// Whether a token can carry a food name on its own
    fn is_food_word(&self, token: &Token) -> bool {
        let lower = token.lower();
        !token.is_stop
            && !token.like_num
            && !token.is_punct
            && lower.chars().any(char::is_alphabetic)
            && !self.units.is_unit(&lower)
            && !self.units.is_non_food_word(&lower)
    }
}

/// Index of the next numeric token at or after `from`, or the sequence length
fn next_numeric_index(tokens: &[Token], from: usize) -> usize {
    tokens
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, token)| token.like_num)
        .map(|(i, _)| i)
        .unwrap_or(tokens.len())
}
