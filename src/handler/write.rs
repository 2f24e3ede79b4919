//! Write path (POST)
//!
//! Appends one payment row in fixed column order. The sheet's own header
//! layout is only consulted when header checking is switched on.

use serde::Serialize;

use super::error::HandlerError;
use super::read::SHEET_NOT_FOUND;
use super::target::resolve_sheet;
use crate::config::SpreadsheetConfig;
use crate::sheet::{check_headers, HeaderCheck, PaymentRecord};
use crate::store::{SpreadsheetStore, StoreError};

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub default_sheet: Option<String>,
    pub check_headers: bool,
    pub headers: Vec<String>,
}

impl From<&SpreadsheetConfig> for WriteOptions {
    fn from(config: &SpreadsheetConfig) -> Self {
        Self {
            default_sheet: config.default_sheet.clone(),
            check_headers: config.check_write_headers,
            headers: config.write_headers.clone(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum WriteResponse {
    Success {
        status: &'static str,
    },
    Error {
        error: &'static str,
    },
    HeaderMismatch {
        error: &'static str,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl WriteResponse {
    const fn success() -> Self {
        Self::Success { status: "success" }
    }

    const fn sheet_not_found() -> Self {
        Self::Error {
            error: SHEET_NOT_FOUND,
        }
    }
}

/// Serve one POST with an already-buffered body
pub async fn write(
    store: &dyn SpreadsheetStore,
    options: &WriteOptions,
    sheet: Option<&str>,
    body: &[u8],
) -> Result<WriteResponse, HandlerError> {
    let record: PaymentRecord = serde_json::from_slice(body)?;

    let Some(sheet) = resolve_sheet(store, sheet, options.default_sheet.as_deref()).await? else {
        return Ok(WriteResponse::sheet_not_found());
    };

    match append(store, options, &sheet, &record).await {
        Err(StoreError::SheetNotFound(_)) => Ok(WriteResponse::sheet_not_found()),
        other => Ok(other?),
    }
}

async fn append(
    store: &dyn SpreadsheetStore,
    options: &WriteOptions,
    sheet: &str,
    record: &PaymentRecord,
) -> Result<WriteResponse, StoreError> {
    if options.check_headers {
        let values = store.read_values(sheet).await?;
        if let HeaderCheck::Mismatch { expected, actual } =
            check_headers(&options.headers, values.first().map(Vec::as_slice))
        {
            return Ok(WriteResponse::HeaderMismatch {
                error: "Header mismatch",
                expected,
                actual,
            });
        }
    }

    store.append_row(sheet, record.to_row()).await?;
    Ok(WriteResponse::success())
}
