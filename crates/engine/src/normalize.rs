//! Text and number normalization for loosely-structured exports.
//!
//! Parsing here is best-effort by contract: a garbled numeric cell
//! contributes zero instead of aborting the run.

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a header for matching: lowercase, strip diacritics and ordinal
/// indicators, trim. Never used for display.
pub fn normalize_text(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !matches!(c, 'º' | 'ª' | '°'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse a numeric cell that may use either `1.234,56` or `1,234.56`
/// conventions, with optional currency symbols.
///
/// When both separators are present the rightmost one is the decimal
/// separator. A lone `,` is decimal. A lone `.` is always decimal, so a
/// dot-grouped thousands value like `"1.000"` parses as 1 — a known,
/// intentionally preserved quirk of the format heuristic.
pub fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() || s == "-" || s == "*" {
        return 0.0;
    }

    // Strip currency markers and whitespace
    let s: String = s
        .chars()
        .filter(|c| !matches!(c, 'R' | '$') && !c.is_whitespace())
        .collect();

    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');

    let cleaned = match (last_dot, last_comma) {
        (Some(d), Some(c)) => {
            if c > d {
                // 2.236,000 — dots group thousands, comma is decimal
                s.replace('.', "").replace(',', ".")
            } else {
                // 1,234.56 — commas group thousands
                s.replace(',', "")
            }
        }
        (None, Some(_)) => s.replace(',', "."),
        _ => s,
    };

    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Extract a 13-digit book identifier (prefix 978/979) from a cell.
///
/// Checks the whole cleaned value first, then falls back to scanning for an
/// embedded run. No check-digit validation.
pub fn extract_isbn(value: &str) -> Option<String> {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let digits: String = cleaned.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 13 && (digits.starts_with("978") || digits.starts_with("979")) {
        return Some(digits);
    }

    let re = Regex::new(r"97[89]\d{10}").unwrap();
    re.find(&cleaned).map(|m| m.as_str().to_string())
}

/// Round to one decimal place, the display precision used throughout.
pub fn round1(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_accents_and_ordinals() {
        assert_eq!(normalize_text("Código"), "codigo");
        assert_eq!(normalize_text("  Descrição  "), "descricao");
        assert_eq!(normalize_text("3º Nº de Item"), "3 n de item");
        assert_eq!(normalize_text("Mês/Ano"), "mes/ano");
    }

    #[test]
    fn parse_both_separators_rightmost_is_decimal() {
        assert_eq!(parse_number("2.236,000"), 2236.0);
        assert_eq!(parse_number("1,234.56"), 1234.56);
    }

    #[test]
    fn parse_lone_comma_is_decimal() {
        assert_eq!(parse_number("1,5"), 1.5);
        assert_eq!(parse_number("69,9"), 69.9);
    }

    #[test]
    fn parse_lone_dot_is_decimal() {
        assert_eq!(parse_number("69.9"), 69.9);
        assert_eq!(parse_number("31.217333"), 31.217333);
        // Documented quirk: dot-grouped thousands parse as a decimal
        assert_eq!(parse_number("1.000"), 1.0);
    }

    #[test]
    fn parse_currency_and_placeholders() {
        assert_eq!(parse_number("R$ 50,00"), 50.0);
        assert_eq!(parse_number("R$ 1.250,75"), 1250.75);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("-"), 0.0);
        assert_eq!(parse_number("*"), 0.0);
        assert_eq!(parse_number("n/d"), 0.0);
    }

    #[test]
    fn parse_negative() {
        assert_eq!(parse_number("-12,5"), -12.5);
    }

    #[test]
    fn isbn_direct_match() {
        assert_eq!(
            extract_isbn("978-85-359-0277-5"),
            Some("9788535902775".into())
        );
        assert_eq!(extract_isbn("9791234567890"), Some("9791234567890".into()));
    }

    #[test]
    fn isbn_embedded_in_text() {
        assert_eq!(
            extract_isbn("EAN:9788545 sequência 9782398765432 fim"),
            Some("9782398765432".into())
        );
    }

    #[test]
    fn isbn_rejects_wrong_prefix_or_length() {
        assert_eq!(extract_isbn("1234567890123"), None);
        assert_eq!(extract_isbn("97812345"), None);
        assert_eq!(extract_isbn(""), None);
    }
}
