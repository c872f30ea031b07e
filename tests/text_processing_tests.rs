//! # Extraction Tests
//!
//! End-to-end checks of quantity, unit and food extraction over diary text.

#[cfg(test)]
mod tests {
    use food_diary::annotation::{Annotation, Annotator, NounChunk, PartOfSpeech, Token};
    use food_diary::quantity::parse_quantity;
    use food_diary::text_processing::{ExtractionConfig, FoodExtractor};
    use food_diary::units::UnitTable;
    use food_diary::IngredientRecord;
    use std::sync::Arc;

    fn extract(text: &str) -> Vec<IngredientRecord> {
        FoodExtractor::with_defaults().extract(text)
    }

    fn summary(records: &[IngredientRecord]) -> Vec<(f64, &str, &str)> {
        records
            .iter()
            .map(|r| (r.quantity, r.unit.as_str(), r.food.as_str()))
            .collect()
    }

    #[test]
    fn test_quantity_literals() {
        assert_eq!(parse_quantity("1/2"), Some(0.5));
        assert_eq!(parse_quantity("1.5"), Some(1.5));
        assert_eq!(parse_quantity("2"), Some(2.0));
        assert_eq!(parse_quantity("1/0"), None);
        assert_eq!(parse_quantity("1.2.3"), None);
    }

    #[test]
    fn test_unit_normalization_ignores_case_and_plural() {
        let table = UnitTable::default();
        for (singular, plural) in [("cup", "cups"), ("ounce", "ounces"), ("gram", "grams")] {
            let factor = table.normalize(singular);
            assert!(factor.is_some());
            assert_eq!(table.normalize(plural), factor);
            assert_eq!(table.normalize(&plural.to_uppercase()), factor);
        }
    }

    #[test]
    fn test_rice_and_chicken_sentence() {
        let records = extract("I ate 2 cups of rice and 8 oz of chicken.");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].quantity, 2.0);
        assert_eq!(records[0].unit, "cups");
        assert_eq!(records[0].unit_factor, 240.0);
        assert_eq!(records[0].food, "rice");

        assert_eq!(records[1].quantity, 8.0);
        assert_eq!(records[1].unit, "oz");
        assert!((records[1].unit_factor - 28.35).abs() < 1e-9);
        assert_eq!(records[1].food, "chicken");
    }

    #[test]
    fn test_fraction_without_filler_word() {
        let records = extract("1/2 cup oatmeal");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quantity, 0.5);
        assert_eq!(records[0].unit, "cup");
        assert_eq!(records[0].unit_factor, 240.0);
        assert_eq!(records[0].normalized_quantity, 120.0);
        assert_eq!(records[0].food, "oatmeal");
    }

    #[test]
    fn test_number_without_food_is_rejected() {
        assert!(extract("I called him 3 times").is_empty());
        assert!(extract("Slept 8 hours").is_empty());
    }

    #[test]
    fn test_stop_words_alone_are_not_a_food() {
        assert!(extract("2 cups of the").is_empty());
        assert!(extract("Had 3 of them").is_empty());
    }

    #[test]
    fn test_food_phrase_is_capped_at_max_food_words() {
        let extractor = FoodExtractor::new(
            Arc::new(food_diary::annotation::LexiconAnnotator::new()),
            Arc::new(UnitTable::default()),
            ExtractionConfig {
                unit_window: 3,
                max_food_words: 2,
            },
        )
        .unwrap();

        let records = extractor.extract("2 big fresh red juicy apples");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].unit, "unit");
        assert_eq!(records[0].food, "big fresh");
        assert_eq!(records[0].food.split_whitespace().count(), 2);
    }

    #[test]
    fn test_text_without_numbers_is_empty() {
        assert!(extract("Had a lovely salad for lunch").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_case_insensitive_input() {
        assert_eq!(extract("2 CUPS of Rice"), extract("2 cups of rice"));
    }

    #[test]
    fn test_normalized_quantity_invariant() {
        let text = "Breakfast: 2 eggs, 1/2 cup oatmeal, 1 tbsp honey and 250 ml of milk. \
                    Lunch: 3 oz turkey breast with 2 slices of bread.";
        let records = extract(text);

        assert!(!records.is_empty());
        for record in &records {
            assert_eq!(record.normalized_quantity, record.quantity * record.unit_factor);
        }
    }

    #[test]
    fn test_records_follow_text_order() {
        let records = extract(
            "Breakfast: 2 eggs, 1/2 cup oatmeal, 1 tbsp honey and 250 ml of milk. \
             Lunch: 3 oz turkey breast with 2 slices of bread.",
        );

        assert_eq!(
            summary(&records),
            vec![
                (2.0, "unit", "eggs"),
                (0.5, "cup", "oatmeal"),
                (1.0, "tbsp", "honey"),
                (250.0, "ml", "milk"),
                (3.0, "oz", "turkey breast"),
                (2.0, "slices", "bread"),
            ]
        );
    }

    #[test]
    fn test_compound_food_names_stay_whole() {
        let records = extract("2 tbsp peanut butter and 1 slice of whole wheat bread");

        assert_eq!(
            summary(&records),
            vec![
                (2.0, "tbsp", "peanut butter"),
                (1.0, "slice", "whole wheat bread"),
            ]
        );
    }

    #[test]
    fn test_implicit_count_unit() {
        let records = extract("3 eggs");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].unit, "unit");
        assert_eq!(records[0].unit_factor, 1.0);
        assert_eq!(records[0].normalized_quantity, 3.0);
        assert_eq!(records[0].query_phrase(), "3 eggs");
    }

    #[test]
    fn test_adjacent_mentions_do_not_share_tokens() {
        let records = extract("2 eggs 3 apples");
        assert_eq!(summary(&records), vec![(2.0, "unit", "eggs"), (3.0, "unit", "apples")]);
    }

    #[test]
    fn test_unparseable_quantity_is_skipped() {
        assert!(extract("1/0 cup rice").is_empty());

        let records = extract("1/0 cup rice and 2 apples");
        assert_eq!(summary(&records), vec![(2.0, "unit", "apples")]);
    }

    #[test]
    fn test_decimal_and_vulgar_fraction_quantities() {
        let records = extract("1.5 oz cheese and ½ cup of milk");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].quantity, 1.5);
        assert_eq!(records[0].food, "cheese");
        assert_eq!(records[1].quantity, 0.5);
        assert_eq!(records[1].normalized_quantity, 120.0);
    }

    #[test]
    fn test_attached_metric_unit() {
        let records = extract("500g chicken");
        assert_eq!(summary(&records), vec![(500.0, "g", "chicken")]);
        assert_eq!(records[0].normalized_quantity, 500.0);
    }

    #[test]
    fn test_thousands_separator_quantity() {
        let records = extract("Cooked 1,000 g of rice for the week");
        assert_eq!(summary(&records), vec![(1000.0, "g", "rice")]);
        assert_eq!(records[0].normalized_quantity, 1000.0);
    }

    #[test]
    fn test_unit_window_limits_scan() {
        let extractor = FoodExtractor::new(
            Arc::new(food_diary::annotation::LexiconAnnotator::new()),
            Arc::new(UnitTable::default()),
            ExtractionConfig {
                unit_window: 1,
                max_food_words: 6,
            },
        )
        .unwrap();

        // "cups" is the second token after the quantity, outside a window of one
        let records = extractor.extract("2 big cups rice");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].unit, "unit");
    }

    #[test]
    fn test_unit_table_injection() {
        let config = food_diary::units::MeasurementUnitsConfig::from_json(
            r#"{
                "measurement_units": {
                    "weight_units": {"g": 1.0},
                    "volume_units": {"bowl": 300.0},
                    "count_units": {"piece": 1.0}
                }
            }"#,
        )
        .unwrap();
        let units = UnitTable::from_config(&config).unwrap();
        let extractor = FoodExtractor::new(
            Arc::new(food_diary::annotation::LexiconAnnotator::new()),
            Arc::new(units),
            ExtractionConfig::default(),
        )
        .unwrap();

        let records = extractor.extract("2 bowls of soup and 1 bowl of rice");
        // Only the exact surface form "bowl" is known to this table
        assert_eq!(records[1].unit, "bowl");
        assert_eq!(records[1].normalized_quantity, 300.0);
        assert_eq!(records[0].unit, "unit");
    }

    /// Annotator returning a fixed, hand-tagged annotation
    struct FixedAnnotator(Annotation);

    impl Annotator for FixedAnnotator {
        fn annotate(&self, _text: &str) -> Annotation {
            self.0.clone()
        }
    }

    fn token(index: usize, text: &str, pos: PartOfSpeech, like_num: bool, is_stop: bool) -> Token {
        Token {
            text: text.to_string(),
            index,
            like_num,
            pos,
            is_stop,
            is_punct: pos == PartOfSpeech::Punct,
        }
    }

    #[test]
    fn test_custom_annotator_chunks_are_used() {
        // The annotator treats "kale salad" as one chunk
        let annotation = Annotation {
            tokens: vec![
                token(0, "4", PartOfSpeech::Num, true, false),
                token(1, "oz", PartOfSpeech::Noun, false, false),
                token(2, "kale", PartOfSpeech::Noun, false, false),
                token(3, "salad", PartOfSpeech::Noun, false, false),
            ],
            noun_chunks: vec![NounChunk {
                start: 2,
                end: 4,
                text: "kale salad".to_string(),
            }],
        };
        let extractor = FoodExtractor::new(
            Arc::new(FixedAnnotator(annotation)),
            Arc::new(UnitTable::default()),
            ExtractionConfig::default(),
        )
        .unwrap();

        let records = extractor.extract("ignored");
        assert_eq!(summary(&records), vec![(4.0, "oz", "kale salad")]);
    }

    #[test]
    fn test_custom_annotator_stop_word_chunk_is_rejected() {
        // The only chunk after the unit holds nothing but stop words
        let annotation = Annotation {
            tokens: vec![
                token(0, "2", PartOfSpeech::Num, true, false),
                token(1, "cups", PartOfSpeech::Noun, false, false),
                token(2, "really", PartOfSpeech::Adv, false, false),
                token(3, "the", PartOfSpeech::Det, false, true),
                token(4, "same", PartOfSpeech::Adj, false, true),
            ],
            noun_chunks: vec![NounChunk {
                start: 3,
                end: 5,
                text: "the same".to_string(),
            }],
        };
        let extractor = FoodExtractor::new(
            Arc::new(FixedAnnotator(annotation)),
            Arc::new(UnitTable::default()),
            ExtractionConfig::default(),
        )
        .unwrap();

        assert!(extractor.extract("ignored").is_empty());
    }
}
