//! Localized plain-text rendering of diary reports

use crate::diary::DiaryReport;
use crate::ingredient::format_quantity;
use crate::localization::LocalizationManager;

fn format_amount(value: f64) -> String {
    format!("{:.1}", value)
}

fn format_optional(value: Option<f64>, unknown: &str) -> String {
    value.map(format_amount).unwrap_or_else(|| unknown.to_string())
}

/// Render a report as terminal text in the given language
pub fn format_report(report: &DiaryReport, localization: &LocalizationManager, language: &str) -> String {
    let t = |key: &str| localization.get_message_in_language(key, language, None);
    let t_args =
        |key: &str, args: &[(&str, &str)]| localization.get_message_with_args_in_language(key, language, args);
    let unknown = t("value-unknown");

    let mut lines = vec![t_args("report-title", &[("entry", report.entry.as_str())]), String::new()];

    lines.push(t("report-ingredients-header"));
    for record in &report.ingredients {
        let phrase = record.query_phrase();
        let normalized = format_quantity(record.normalized_quantity);
        lines.push(t_args(
            "report-ingredient-line",
            &[("phrase", phrase.as_str()), ("normalized", normalized.as_str())],
        ));
    }
    lines.push(String::new());

    lines.push(t("report-foods-header"));
    for food in &report.nutrition.foods {
        let calories = format_optional(food.calories, &unknown);
        let protein = format_optional(food.protein, &unknown);
        let carbs = format_optional(food.carbs, &unknown);
        let fat = format_optional(food.fat, &unknown);
        let sugar = format_optional(food.sugar, &unknown);
        lines.push(t_args(
            "report-food-line",
            &[
                ("food", food.food_name.as_str()),
                ("serving", food.serving.as_str()),
                ("calories", calories.as_str()),
                ("protein", protein.as_str()),
                ("carbs", carbs.as_str()),
                ("fat", fat.as_str()),
                ("sugar", sugar.as_str()),
            ],
        ));
    }
    lines.push(String::new());

    let totals = &report.nutrition.totals;
    lines.push(t("report-totals-header"));
    for (key, value) in [
        ("report-total-calories", totals.calories),
        ("report-total-protein", totals.protein),
        ("report-total-carbs", totals.carbs),
        ("report-total-fat", totals.fat),
        ("report-total-sugar", totals.sugar),
    ] {
        let value = format_amount(value);
        lines.push(format!("  {}", t_args(key, &[("value", value.as_str())])));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient::assemble;
    use crate::nutrition::{calculate_macros, StaticNutritionTable};
    use chrono::Utc;

    fn sample_report() -> DiaryReport {
        let ingredients = vec![assemble(2.0, "cups", 240.0, "rice").unwrap()];
        let nutrition = calculate_macros(&ingredients, &StaticNutritionTable::with_defaults());
        DiaryReport {
            entry: "2 cups of rice".to_string(),
            ingredients,
            nutrition,
            source: "static".to_string(),
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_english_report() {
        let localization = LocalizationManager::new().unwrap();
        let text = format_report(&sample_report(), &localization, "en");

        assert!(text.starts_with("Nutrition estimate for: 2 cups of rice"));
        assert!(text.contains("• 2 cups of rice (normalized: 480)"));
        assert!(text.contains("Carbohydrates: 134.4 g"));
        assert!(text.contains("Calories: 624.0 kcal"));
    }

    #[test]
    fn test_french_report() {
        let localization = LocalizationManager::new().unwrap();
        let text = format_report(&sample_report(), &localization, "fr");

        assert!(text.contains("Glucides : 134.4 g"));
        assert!(text.contains("Totaux :"));
    }

    #[test]
    fn test_missing_values_render_unknown() {
        let localization = LocalizationManager::new().unwrap();
        let mut report = sample_report();
        report.nutrition.foods[0].sugar = None;

        let text = format_report(&report, &localization, "en");
        assert!(text.contains("sugar n/a g"));
    }
}
