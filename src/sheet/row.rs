//! Row objects built by zipping the header row with each data row

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::cell::CellValue;

/// Ordered header-to-value mapping for one data row
///
/// Keys keep the position of their first occurrence; a repeated header
/// overwrites the earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowObject {
    fields: Vec<(String, CellValue)>,
}

impl RowObject {
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn insert(&mut self, key: String, value: CellValue) {
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// First field (in column order) whose key matches any candidate, ignoring case
    pub fn get_any_ignore_case(&self, candidates: &[&str]) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(k, _)| candidates.iter().any(|c| k.eq_ignore_ascii_case(c)))
            .map(|(_, v)| v)
    }

    pub fn first_value(&self) -> Option<&CellValue> {
        self.fields.first().map(|(_, v)| v)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RowObject {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k.into(), v);
        }
        row
    }
}

impl Serialize for RowObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A data row is blank when its first two columns are both falsy
///
/// Later columns are not looked at, so a row with only a note in column C
/// still counts as blank.
pub fn is_blank_row(row: &[CellValue]) -> bool {
    let first = row.first().unwrap_or(&CellValue::Empty);
    let second = row.get(1).unwrap_or(&CellValue::Empty);
    first.is_falsy() && second.is_falsy()
}

/// Turn a used range into row objects
///
/// Row 0 is the header row. Blank rows are skipped. Cells missing from a
/// short row read as empty; cells beyond the header width are dropped.
pub fn rows_to_objects(values: &[Vec<CellValue>]) -> Vec<RowObject> {
    let Some((header_row, data_rows)) = values.split_first() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_row.iter().map(CellValue::to_key).collect();

    data_rows
        .iter()
        .filter(|row| !is_blank_row(row))
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    #[test]
    fn test_headers_zip_with_row() {
        let values = vec![text_row(&["A", "B"]), text_row(&["x", "y"])];
        let rows = rows_to_objects(&values);
        assert_eq!(rows.len(), 1);
        assert_eq!(serde_json::to_string(&rows).unwrap(), r#"[{"A":"x","B":"y"}]"#);
    }

    #[test]
    fn test_blank_row_skipped_even_with_later_values() {
        let values = vec![
            text_row(&["A", "B", "C"]),
            text_row(&["", "", "note"]),
            text_row(&["x", "", ""]),
        ];
        let rows = rows_to_objects(&values);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("A"), Some(&CellValue::text("x")));
    }

    #[test]
    fn test_zero_counts_as_blank() {
        let values = vec![
            text_row(&["A", "B"]),
            vec![CellValue::Number(0.0), CellValue::Empty],
            vec![CellValue::Number(0.0), CellValue::Number(1.0)],
        ];
        assert_eq!(rows_to_objects(&values).len(), 1);
    }

    #[test]
    fn test_short_rows_padded() {
        let values = vec![text_row(&["A", "B", "C"]), text_row(&["x", "y"])];
        let rows = rows_to_objects(&values);
        assert_eq!(rows[0].get("C"), Some(&CellValue::Empty));
        assert_eq!(serde_json::to_string(&rows[0]).unwrap(), r#"{"A":"x","B":"y","C":""}"#);
    }

    #[test]
    fn test_header_only_and_empty_sheet() {
        assert!(rows_to_objects(&[]).is_empty());
        assert!(rows_to_objects(&[text_row(&["A", "B"])]).is_empty());
    }

    #[test]
    fn test_duplicate_header_keeps_first_position_last_value() {
        let values = vec![text_row(&["A", "B", "A"]), text_row(&["1", "2", "3"])];
        let rows = rows_to_objects(&values);
        assert_eq!(
            serde_json::to_string(&rows[0]).unwrap(),
            r#"{"A":"3","B":"2"}"#
        );
    }

    #[test]
    fn test_numeric_headers_stringified() {
        let values = vec![
            vec![CellValue::Number(2024.0), CellValue::text("B")],
            text_row(&["x", "y"]),
        ];
        let rows = rows_to_objects(&values);
        assert_eq!(rows[0].get("2024"), Some(&CellValue::text("x")));
    }

    #[test]
    fn test_case_insensitive_lookup_uses_column_order() {
        let row: RowObject = vec![
            ("qty", CellValue::Number(2.0)),
            ("Cantidad", CellValue::Number(5.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            row.get_any_ignore_case(&["CANTIDAD", "Qty"]),
            Some(&CellValue::Number(2.0))
        );
        assert_eq!(row.get_any_ignore_case(&["total"]), None);
    }
}
