//! Validation of diary entry input
//!
//! Error values are localization keys so the CLI can render them directly.

/// Default maximum diary entry length in characters
pub const DEFAULT_MAX_ENTRY_LENGTH: usize = 2000;

/// Validates a diary entry before extraction
///
/// # Arguments
/// * `entry` - The raw diary entry text
/// * `max_length` - Maximum accepted length in characters
///
/// # Returns
/// * `Ok(&str)` - The trimmed entry if valid
/// * `Err(&str)` - Error key: "entry-empty" or "entry-too-long"
///
/// # Examples
/// ```
/// use food_diary::validation::validate_diary_entry;
///
/// assert_eq!(validate_diary_entry("  2 eggs ", 2000), Ok("2 eggs"));
/// assert_eq!(validate_diary_entry("   ", 2000), Err("entry-empty"));
/// assert_eq!(validate_diary_entry(&"a".repeat(11), 10), Err("entry-too-long"));
/// ```
pub fn validate_diary_entry(entry: &str, max_length: usize) -> Result<&str, &'static str> {
    let trimmed = entry.trim();

    if trimmed.is_empty() {
        return Err("entry-empty");
    }

    if trimmed.chars().count() > max_length {
        return Err("entry-too-long");
    }

    Ok(trimmed)
}
