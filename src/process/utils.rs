use once_cell::sync::Lazy;
use regex::Regex;

use crate::grid::Cell;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").expect("valid regex"));

/// 1) Parse a decimal that may use a comma separator ("12,5" → 12.5).
/// Only surrounding whitespace is tolerated; quoted numbers are unparsable,
/// as are non-finite results.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric value of a data cell, if it has one.
pub fn cell_to_rate(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => parse_decimal(s),
        _ => None,
    }
}

/// 2) Pull a 4-digit year out of a header label ("2010", "2010 (1)", "Ano 2022").
pub fn parse_year(label: &str) -> Option<i32> {
    YEAR_RE
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_numbers_are_not_parsed() {
        assert_eq!(parse_decimal("\"12,5\""), None);
        assert_eq!(parse_decimal("'8,0'"), None);
        assert_eq!(parse_decimal("1e2"), Some(100.0));
    }

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(parse_decimal("12,5"), Some(12.5));
        assert_eq!(parse_decimal("8,0"), Some(8.0));
        assert_eq!(parse_decimal(" 97.3 "), Some(97.3));
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal("..."), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn test_cell_to_rate() {
        assert_eq!(cell_to_rate(&Cell::Number(3.0)), Some(3.0));
        assert_eq!(cell_to_rate(&Cell::Text("4,25".into())), Some(4.25));
        assert_eq!(cell_to_rate(&Cell::Bool(true)), None);
        assert_eq!(cell_to_rate(&Cell::Empty), None);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2010"), Some(2010));
        assert_eq!(parse_year("2010 (1)"), Some(2010));
        assert_eq!(parse_year("Ano 2022"), Some(2022));
        assert_eq!(parse_year("Total"), None);
        assert_eq!(parse_year("201"), None);
    }
}
