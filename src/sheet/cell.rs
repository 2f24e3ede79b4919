//! Cell values and A1 cell references
//!
//! A cell holds whatever the spreadsheet holds: nothing, a boolean, a number
//! or text. Values serialize the way spreadsheet web apps emit them: empty
//! cells as `""` and integral numbers without a fractional part.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest integer an `f64` represents exactly
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A single spreadsheet cell value
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Falsy in the loose scripting sense: empty, `""`, `0`, NaN or `false`
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bool(b) => !b,
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::Text(s) => s.is_empty(),
        }
    }

    /// Numeric view of the cell, if it has one
    ///
    /// Text is trimmed and parsed as a plain float; no locale handling here
    /// (see `analytics::amount` for that).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// String used when the cell acts as an object key (header row)
    pub fn to_key(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Empty => serde_json::Value::String(String::new()),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => integral(*n).map_or_else(
                || {
                    serde_json::Number::from_f64(*n)
                        .map_or(serde_json::Value::Null, serde_json::Value::Number)
                },
                |i| serde_json::Value::Number(i.into()),
            ),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Integral floats inside the exact range, as `i64`
#[allow(clippy::cast_possible_truncation)]
fn integral(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_EXACT_INT).then_some(n as i64)
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Empty, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Self::Text(other.to_string())
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_str(""),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => match integral(*n) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{n}"),
            },
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Zero-based cell position parsed from A1 notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct CellRef {
    pub row: usize,
    pub column: usize,
}

impl CellRef {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Look the cell up in a range read from the top-left corner
    pub fn lookup<'a>(&self, rows: &'a [Vec<CellValue>]) -> Option<&'a CellValue> {
        rows.get(self.row)?.get(self.column)
    }
}

impl FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| format!("Invalid cell reference '{s}': missing row"))?;
        let (letters, digits) = s.split_at(split);

        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("Invalid cell reference '{s}': bad column"));
        }

        let column = letters
            .chars()
            .map(|c| c.to_ascii_uppercase() as usize - 'A' as usize + 1)
            .try_fold(0usize, |acc, n| acc.checked_mul(26)?.checked_add(n))
            .ok_or_else(|| format!("Invalid cell reference '{s}': column overflow"))?
            - 1;

        let row: usize = digits
            .parse()
            .map_err(|_| format!("Invalid cell reference '{s}': bad row"))?;
        if row == 0 {
            return Err(format!("Invalid cell reference '{s}': rows start at 1"));
        }

        Ok(Self {
            row: row - 1,
            column,
        })
    }
}

impl TryFrom<String> for CellRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut n = self.column + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            #[allow(clippy::cast_possible_truncation)]
            letters.push(char::from(b'A' + rem as u8));
            n = (n - 1) / 26;
        }
        letters.reverse();
        let letters: String = letters.into_iter().collect();
        write!(f, "{letters}{}", self.row + 1)
    }
}
