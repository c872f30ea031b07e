//! Quantity literal parsing: integers, decimals, comma-grouped thousands,
//! `n/d` fractions and single Unicode vulgar fractions.
//!
//! A literal that does not parse to a finite value greater than zero yields
//! `None` and the candidate is dropped. There is no default-to-1 fallback.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"^\d+$").expect("Invalid integer regex pattern");
    static ref DECIMAL: Regex = Regex::new(r"^\d+\.\d+$").expect("Invalid decimal regex pattern");
    static ref GROUPED: Regex = Regex::new(r"^\d{1,3}(?:,\d{3})+(?:\.\d+)?$")
        .expect("Invalid grouped number regex pattern");
    static ref FRACTION: Regex =
        Regex::new(r"^(?P<num>\d+)/(?P<den>\d+)$").expect("Invalid fraction regex pattern");
}

fn vulgar_fraction(c: char) -> Option<f64> {
    let value = match c {
        '½' => 1.0 / 2.0,
        '⅓' => 1.0 / 3.0,
        '⅔' => 2.0 / 3.0,
        '¼' => 1.0 / 4.0,
        '¾' => 3.0 / 4.0,
        '⅕' => 1.0 / 5.0,
        '⅖' => 2.0 / 5.0,
        '⅗' => 3.0 / 5.0,
        '⅘' => 4.0 / 5.0,
        '⅙' => 1.0 / 6.0,
        '⅚' => 5.0 / 6.0,
        '⅛' => 1.0 / 8.0,
        '⅜' => 3.0 / 8.0,
        '⅝' => 5.0 / 8.0,
        '⅞' => 7.0 / 8.0,
        _ => return None,
    };
    Some(value)
}

/// Parse a quantity literal to a positive real value
///
/// # Examples
/// ```
/// use food_diary::quantity::parse_quantity;
///
/// assert_eq!(parse_quantity("2"), Some(2.0));
/// assert_eq!(parse_quantity("1/2"), Some(0.5));
/// assert_eq!(parse_quantity("1.5"), Some(1.5));
/// assert_eq!(parse_quantity("1,000"), Some(1000.0));
/// assert_eq!(parse_quantity("1/0"), None);
/// assert_eq!(parse_quantity("two"), None);
/// ```
pub fn parse_quantity(literal: &str) -> Option<f64> {
    let literal = literal.trim();

    let value = if INTEGER.is_match(literal) || DECIMAL.is_match(literal) {
        literal.parse::<f64>().ok()?
    } else if GROUPED.is_match(literal) {
        literal.replace(',', "").parse::<f64>().ok()?
    } else if let Some(caps) = FRACTION.captures(literal) {
        let numerator = caps["num"].parse::<f64>().ok()?;
        let denominator = caps["den"].parse::<f64>().ok()?;
        if denominator == 0.0 {
            return None;
        }
        numerator / denominator
    } else {
        let mut chars = literal.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => vulgar_fraction(c)?,
            _ => return None,
        }
    };

    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Whether a literal is a fractional part that can complete a mixed number ("2 1/2")
pub fn is_fraction_literal(literal: &str) -> bool {
    let literal = literal.trim();
    if FRACTION.is_match(literal) {
        return true;
    }
    let mut chars = literal.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if vulgar_fraction(c).is_some())
}

/// Whether a literal is a plain integer (the whole part of a mixed number)
pub fn is_integer_literal(literal: &str) -> bool {
    INTEGER.is_match(literal.trim())
}
