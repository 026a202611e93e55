//! Text normalization helpers shared by every field extractor.
//!
//! Marketing pages mix French and English phrasing, non-breaking spaces,
//! comma decimals and "unlimited" spelled a dozen ways. Everything downstream
//! assumes these helpers have flattened that noise first.

use once_cell::sync::Lazy;
use regex::Regex;

// Pre-compiled patterns (compile once, use many times)
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex pattern"));

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?\d+(?:[.,]\d+)?").expect("Invalid number regex pattern"));

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3})\s*%").expect("Invalid percent regex pattern"));

// Covers "illimité(e/s)", the accent-less misspellings, English variants,
// flat-rate wording and the infinity glyph.
static UNLIMITED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)illimit|unlimit|\bflat\b|flatrate|∞").expect("Invalid unlimited regex pattern")
});

/// Collapse all whitespace runs (including non-breaking spaces) to single spaces
pub fn clean_text(s: &str) -> String {
    let replaced = s.replace(['\u{a0}', '\u{202f}'], " ");
    WHITESPACE_RE.replace_all(&replaced, " ").trim().to_string()
}

/// Extract the first signed decimal number from free text.
///
/// Accepts both `.` and `,` as decimal separator ("24,95" and "24.95" are the
/// same price). No thousands grouping appears in this domain.
pub fn parse_loose_number(s: &str) -> Option<f64> {
    let m = NUMBER_RE.find(s)?;
    m.as_str().replace(',', ".").parse::<f64>().ok()
}

/// True if the text carries an "unlimited" signal in any language or spelling
pub fn is_unlimited(s: &str) -> bool {
    UNLIMITED_RE.is_match(s)
}

/// Quantity parser that honors unlimited signals.
///
/// Returns positive infinity for unlimited, the first number otherwise, and
/// 0.0 when the text carries neither (the field is expected to be a quantity).
pub fn parse_unlimited_aware(s: &str) -> f64 {
    if is_unlimited(s) {
        return f64::INFINITY;
    }
    parse_loose_number(s).unwrap_or(0.0)
}

/// Extract the first integer percentage (0-100) followed by a `%` sign
pub fn parse_percent(s: &str) -> Option<u32> {
    for caps in PERCENT_RE.captures_iter(s) {
        if let Ok(value) = caps[1].parse::<u32>() {
            if value <= 100 {
                return Some(value);
            }
        }
    }
    None
}

/// Convert a speed value + unit token to integer Mbit/s.
///
/// Gigabit units ("G", "Gbit/s", "Gbps", ...) multiply by 1000; megabit units
/// pass through. Unknown units yield None, not a guess.
pub fn convert_speed_to_mbps(value_text: &str, unit_text: &str) -> Option<u32> {
    let value = parse_loose_number(value_text)?;
    let unit = unit_text.trim().to_lowercase();
    let mbps = if unit.starts_with('g') {
        value * 1000.0
    } else if unit.starts_with('m') {
        value
    } else {
        return None;
    };
    if mbps < 0.0 {
        return None;
    }
    Some(mbps.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  CHF\u{a0}49.95\n\n par  mois "), "CHF 49.95 par mois");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_parse_loose_number() {
        assert_eq!(parse_loose_number("CHF 24,95 / mois"), Some(24.95));
        assert_eq!(parse_loose_number("49.90.-"), Some(49.90));
        assert_eq!(parse_loose_number("no digits here"), None);
    }

    #[test]
    fn test_unlimited_variants() {
        for variant in ["illimité", "unlimited", "Illimité ", "ILLIMITE", "unlimitted", "∞"] {
            assert!(is_unlimited(variant), "should detect: {}", variant);
        }
        assert!(!is_unlimited("100 Go"));
    }

    #[test]
    fn test_parse_unlimited_aware() {
        assert_eq!(parse_unlimited_aware("appels illimités"), f64::INFINITY);
        assert_eq!(parse_unlimited_aware("12 Go"), 12.0);
        assert_eq!(parse_unlimited_aware("rien"), 0.0);
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("-50% sur 12 mois"), Some(50));
        assert_eq!(parse_percent("200% nonsense then 30%"), Some(30));
        assert_eq!(parse_percent("no percent"), None);
    }

    #[test]
    fn test_speed_conversion() {
        assert_eq!(convert_speed_to_mbps("2", "Gbit/s"), Some(2000));
        assert_eq!(convert_speed_to_mbps("300", "Mbit/s"), Some(300));
        assert_eq!(convert_speed_to_mbps("10", "Gbit/s"), Some(10000));
        assert_eq!(convert_speed_to_mbps("1.5", "gbps"), Some(1500));
        assert_eq!(convert_speed_to_mbps("100", "kbit/s"), None);
    }
}
