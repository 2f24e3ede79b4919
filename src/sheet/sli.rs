//! SLI: a scalar read from a fixed cell and returned next to the row data

use super::cell::{CellRef, CellValue};
use crate::store::StoreError;

/// Result of looking up the SLI cell
#[derive(Debug)]
pub enum SliReading {
    Present(CellValue),
    /// The range read does not reach the cell (small sheet)
    Absent,
    Failed(StoreError),
}

impl SliReading {
    /// Look the cell up in an already-read used range
    pub fn from_range(rows: &[Vec<CellValue>], cell: CellRef) -> Self {
        cell.lookup(rows)
            .map_or(Self::Absent, |value| Self::Present(value.clone()))
    }

    /// Value with `0` for anything that is not present
    pub fn value_or_zero(self) -> CellValue {
        match self {
            Self::Present(value) => value,
            Self::Absent | Self::Failed(_) => CellValue::Number(0.0),
        }
    }
}
