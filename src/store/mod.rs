//! Spreadsheet store
//!
//! The spreadsheet is the only persistent state and lives outside this
//! process. Handlers talk to it through [`SpreadsheetStore`], addressing
//! sheets by name; there is no "active sheet" pointer.
//!
//! Backends:
//! - `memory`: in-process workbook
//! - `file`: JSON workbook on disk
//! - `google`: Google Sheets REST API

mod file;
mod google;
mod memory;
mod workbook;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{SpreadsheetConfig, StoreBackend};
use crate::sheet::{CellRef, CellValue};

pub use file::FileStore;
pub use google::GoogleSheetsStore;
pub use memory::MemoryStore;
pub use workbook::Workbook;
#[cfg(test)]
pub use workbook::Sheet;

/// Store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
    #[error("Workbook I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid workbook JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Spreadsheet request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spreadsheet API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid workbook: {0}")]
    InvalidWorkbook(String),
    #[error("Store misconfigured: {0}")]
    Config(String),
}

/// Tabular store with sheet-name-addressed tables
#[async_trait]
pub trait SpreadsheetStore: Send + Sync {
    /// Sheet names in workbook order
    async fn sheet_names(&self) -> Result<Vec<String>, StoreError>;

    /// Canonical URL of the spreadsheet
    async fn url(&self) -> Result<String, StoreError>;

    /// Sheet names and URL together; backends that fetch both in one
    /// request override this
    async fn sheets_and_url(&self) -> Result<(Vec<String>, String), StoreError> {
        Ok((self.sheet_names().await?, self.url().await?))
    }

    /// Full used range of a sheet, starting at A1
    async fn read_values(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError>;

    /// Single cell; empty when outside the used range
    async fn read_cell(&self, sheet: &str, cell: CellRef) -> Result<CellValue, StoreError>;

    /// Append one row after the last row with content
    async fn append_row(&self, sheet: &str, row: Vec<CellValue>) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn SpreadsheetStore>;

/// Build the configured backend
pub fn build(config: &SpreadsheetConfig) -> Result<SharedStore, StoreError> {
    let store: SharedStore = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new(Workbook::with_sheet(
            config.url.clone().unwrap_or_else(|| "memory://workbook".to_string()),
            "Sheet1",
            &config.write_headers,
        ))),
        StoreBackend::File => Arc::new(FileStore::open(
            &config.path,
            config.url.as_deref(),
            &config.write_headers,
        )?),
        StoreBackend::Google => Arc::new(GoogleSheetsStore::from_config(config)?),
    };
    Ok(store)
}
