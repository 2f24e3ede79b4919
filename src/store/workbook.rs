//! Workbook model shared by the in-process backends

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::sheet::{CellRef, CellValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub url: String,
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,
}

impl Workbook {
    /// Workbook with a single sheet whose first row is `headers`
    pub fn with_sheet(url: impl Into<String>, name: &str, headers: &[String]) -> Self {
        let rows = if headers.is_empty() {
            Vec::new()
        } else {
            vec![headers.iter().map(|h| CellValue::text(h.as_str())).collect()]
        };
        Self {
            url: url.into(),
            sheets: vec![Sheet {
                name: name.to_string(),
                rows,
            }],
        }
    }

    /// Reject workbooks the handlers cannot address unambiguously
    pub fn validate(&self) -> Result<(), StoreError> {
        for (i, sheet) in self.sheets.iter().enumerate() {
            if sheet.name.is_empty() {
                return Err(StoreError::InvalidWorkbook(format!("sheet {i} has no name")));
            }
            if self.sheets[..i].iter().any(|s| s.name == sheet.name) {
                return Err(StoreError::InvalidWorkbook(format!(
                    "duplicate sheet name '{}'",
                    sheet.name
                )));
            }
        }
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet, StoreError> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| StoreError::SheetNotFound(name.to_string()))
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet, StoreError> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| StoreError::SheetNotFound(name.to_string()))
    }
}

impl Sheet {
    /// Rows up to the last one with content, padded to a rectangle
    pub fn used_range(&self) -> Vec<Vec<CellValue>> {
        let height = self.content_height();
        let width = self.rows[..height].iter().map(Vec::len).max().unwrap_or(0);
        self.rows[..height]
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.resize(width, CellValue::Empty);
                row
            })
            .collect()
    }

    pub fn cell(&self, cell: CellRef) -> CellValue {
        cell.lookup(&self.rows).cloned().unwrap_or_default()
    }

    /// Append after the last row with content, dropping trailing blank rows
    pub fn append(&mut self, row: Vec<CellValue>) {
        let height = self.content_height();
        self.rows.truncate(height);
        self.rows.push(row);
    }

    fn content_height(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| {
                row.iter()
                    .any(|c| !matches!(c, CellValue::Empty) && *c != CellValue::text(""))
            })
            .map_or(0, |i| i + 1)
    }
}
