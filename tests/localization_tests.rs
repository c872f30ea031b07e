//! # Localization Tests
//!
//! Message retrieval and formatting for every user-facing key in both
//! bundled languages.

use food_diary::localization::{create_localization_manager, LocalizationManager};
use std::collections::HashMap;
use std::sync::Arc;

const USER_FACING_KEYS: [&str; 17] = [
    "config-invalid",
    "entry-empty",
    "entry-too-long",
    "no-ingredients",
    "lookup-failed",
    "report-title",
    "report-ingredients-header",
    "report-ingredient-line",
    "report-foods-header",
    "report-food-line",
    "report-totals-header",
    "report-total-calories",
    "report-total-protein",
    "report-total-carbs",
    "report-total-fat",
    "report-total-sugar",
    "value-unknown",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> Arc<LocalizationManager> {
        create_localization_manager().expect("Failed to create localization manager")
    }

    #[test]
    fn test_every_key_exists_in_every_language() {
        let manager = setup_localization();

        for language in ["en", "fr"] {
            for key in USER_FACING_KEYS {
                let message = manager.get_message_in_language(key, language, None);
                assert!(
                    !message.starts_with("Missing"),
                    "{} missing in {}",
                    key,
                    language
                );
            }
        }
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "en", None);
        assert!(message.starts_with("Missing translation:"));
    }

    #[test]
    fn test_unsupported_language_falls_back_to_english() {
        let manager = setup_localization();

        let english = manager.get_message_in_language("no-ingredients", "en", None);
        let fallback = manager.get_message_in_language("no-ingredients", "de", None);
        assert_eq!(english, fallback);
        assert!(english.contains("be more specific"));
    }

    #[test]
    fn test_messages_differ_by_language() {
        let manager = setup_localization();

        let english = manager.get_message_in_language("report-totals-header", "en", None);
        let french = manager.get_message_in_language("report-totals-header", "fr", None);
        assert_eq!(english, "Totals:");
        assert_eq!(french, "Totaux :");
    }

    #[test]
    fn test_message_arguments() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("error", "[NETWORK] Nutrition API returned 401: unauthorized");
        let message = manager.get_message_in_language("lookup-failed", "en", Some(&args));
        assert_eq!(
            message,
            "Nutrition lookup failed: [NETWORK] Nutrition API returned 401: unauthorized"
        );

        let message =
            manager.get_message_with_args_in_language("report-total-protein", "fr", &[("value", "12.5")]);
        assert_eq!(message, "Protéines : 12.5 g");
    }

    #[test]
    fn test_detect_language() {
        let manager = setup_localization();

        assert_eq!(manager.detect_language(Some("fr")), "fr");
        assert_eq!(manager.detect_language(Some("fr-BE")), "fr");
        assert_eq!(manager.detect_language(Some("es")), "en");
        assert_eq!(manager.detect_language(None), "en");
    }
}
