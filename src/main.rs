use anyhow::Result;
use clap::Parser;
use food_diary::config::AppConfig;
use food_diary::errors::{error_logging, AppError};
use food_diary::localization::{self, LocalizationManager};
use food_diary::observability;
use food_diary::report::format_report;
use food_diary::units::UnitTable;
use food_diary::{DiaryAnalyzer, DiaryOutcome};
use std::env;
use std::process::ExitCode;
use tracing::info;

/// Estimate macros for a free-text food diary entry
#[derive(Parser, Debug)]
#[command(name = "food-diary")]
#[command(version)]
#[command(about = "Extract foods from a diary entry and estimate their macronutrients")]
struct Cli {
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Diary entry, e.g. "I ate 2 cups of rice and 8 oz of chicken"
    #[arg(required = true, num_args = 1..)]
    entry: Vec<String>,
}

impl Cli {
    fn entry_text(&self) -> String {
        self.entry.join(" ")
    }
}

/// Message shown for an analysis error, localized where a key exists
fn error_message(
    error: &AppError,
    localization: &LocalizationManager,
    language: &str,
    max_entry_length: usize,
) -> String {
    match error {
        AppError::Validation(key) => {
            let max = max_entry_length.to_string();
            localization.get_message_with_args_in_language(key, language, &[("max", &max)])
        }
        other => {
            let detail = other.to_string();
            localization.get_message_with_args_in_language("lookup-failed", language, &[("error", &detail)])
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Exits here on --help, --version or bad arguments
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let localization_manager = localization::create_localization_manager()?;

    let config = match AppConfig::from_env().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            let language = localization_manager.detect_language(env::var("LANG").ok().as_deref());
            let detail = e.to_string();
            eprintln!(
                "{}",
                localization_manager.get_message_with_args_in_language(
                    "config-invalid",
                    &language,
                    &[("error", &detail)]
                )
            );
            return Ok(ExitCode::FAILURE);
        }
    };

    let metrics_handle = observability::init_observability(&config.observability)?;
    info!("{}", config.summary());

    let language = localization_manager.detect_language(Some(&config.language));
    let entry = cli.entry_text();

    let units = UnitTable::load().map_err(|e| {
        error_logging::log_config_error(&e, "MEASUREMENT_UNITS_CONFIG_PATH", "load_unit_table");
        e
    })?;
    let analyzer = DiaryAnalyzer::from_config(&config, units)?;

    let exit_code = match analyzer.analyze(&entry).await {
        Ok(DiaryOutcome::Report(report)) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", format_report(&report, &localization_manager, &language));
            }
            ExitCode::SUCCESS
        }
        Ok(DiaryOutcome::NoIngredients) => {
            eprintln!(
                "{}",
                localization_manager.get_message_in_language("no-ingredients", &language, None)
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!(
                "{}",
                error_message(&e, &localization_manager, &language, analyzer.max_entry_length())
            );
            ExitCode::FAILURE
        }
    };

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    Ok(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_collects_entry_words_and_json_flag() {
        let cli = Cli::try_parse_from(["food-diary", "--json", "2", "cups", "of", "rice"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.entry_text(), "2 cups of rice");

        let cli = Cli::try_parse_from(["food-diary", "3", "eggs"]).unwrap();
        assert!(!cli.json);
        assert_eq!(cli.entry_text(), "3 eggs");
    }

    #[test]
    fn test_cli_requires_an_entry() {
        assert!(Cli::try_parse_from(["food-diary"]).is_err());
        assert!(Cli::try_parse_from(["food-diary", "--json"]).is_err());
    }

    #[test]
    fn test_cli_help_and_unknown_flags_are_not_entries() {
        let err = Cli::try_parse_from(["food-diary", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["food-diary", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

        let err = Cli::try_parse_from(["food-diary", "--verbose", "3", "eggs"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_validation_error_message_is_localized() {
        let localization = LocalizationManager::new().unwrap();
        let message = error_message(
            &AppError::Validation("entry-too-long".to_string()),
            &localization,
            "en",
            2000,
        );
        assert!(message.contains("2000"));

        let message = error_message(
            &AppError::Network("Nutrition API returned 401: bad key".to_string()),
            &localization,
            "en",
            2000,
        );
        assert!(message.starts_with("Nutrition lookup failed:"));
        assert!(message.contains("401"));
    }
}
