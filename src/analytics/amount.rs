//! Lenient amount and currency parsing for hand-typed sheet cells

use serde::Serialize;

use crate::sheet::CellValue;

/// Parse an amount typed with either decimal convention
///
/// `1.234,56` and `1,234.56` both read as 1234.56. A lone comma followed by
/// exactly two digits is a decimal comma (`12,50`); otherwise commas are
/// thousands separators (`1,200`). Anything unparseable reads as 0.
pub fn parse_amount(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Number(n) => *n,
        CellValue::Bool(b) => f64::from(u8::from(*b)),
        CellValue::Empty => 0.0,
        CellValue::Text(s) => parse_amount_text(s),
    }
}

fn parse_amount_text(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    let normalized = match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(comma)) => {
            if s.matches(',').count() == 1 && s[comma + 1..].len() == 2 {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        _ => s.to_string(),
    };

    normalized.parse().unwrap_or(0.0)
}

/// Currencies the payment log tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Currency {
    #[serde(rename = "PEN")]
    Pen,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    /// `USD` anywhere means dollars; everything else (PEN, soles, blank) is soles
    pub fn from_cell(cell: &CellValue) -> Self {
        let raw = cell.to_string().to_uppercase();
        if raw.contains("USD") {
            Self::Usd
        } else {
            Self::Pen
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> f64 {
        parse_amount(&CellValue::text(s))
    }

    #[test]
    fn test_plain_numbers() {
        assert!((parse_amount(&CellValue::Number(-42.5)) + 42.5).abs() < f64::EPSILON);
        assert!((amount(" 100 ") - 100.0).abs() < f64::EPSILON);
        assert!(amount("").abs() < f64::EPSILON);
        assert!(parse_amount(&CellValue::Empty).abs() < f64::EPSILON);
    }

    #[test]
    fn test_european_and_us_formats() {
        assert!((amount("1.234,56") - 1234.56).abs() < 1e-9);
        assert!((amount("1,234.56") - 1234.56).abs() < 1e-9);
        assert!((amount("-2.000,10") + 2000.10).abs() < 1e-9);
    }

    #[test]
    fn test_single_comma_heuristic() {
        assert!((amount("12,50") - 12.5).abs() < 1e-9);
        assert!((amount("1,200") - 1200.0).abs() < 1e-9);
        assert!((amount("1,234,567") - 1_234_567.0).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_is_zero() {
        assert!(amount("S/ abc").abs() < f64::EPSILON);
    }

    #[test]
    fn test_currency_detection() {
        assert_eq!(Currency::from_cell(&CellValue::text("usd ")), Currency::Usd);
        assert_eq!(Currency::from_cell(&CellValue::text("Soles")), Currency::Pen);
        assert_eq!(Currency::from_cell(&CellValue::text("PEN")), Currency::Pen);
        assert_eq!(Currency::from_cell(&CellValue::Empty), Currency::Pen);
    }
}
