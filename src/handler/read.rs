//! Read path (GET)
//!
//! Lists sheets, or turns the target sheet into row objects, optionally
//! alongside the SLI cell. The summary and landed-cost views are computed
//! from the same row objects.

use serde::Serialize;

use super::query::{ReadAction, RequestQuery};
use super::target::resolve_sheet;
use crate::analytics::{landed_cost, summarize, LandedCost, PaymentSummary};
use crate::config::{ReadFormat, SpreadsheetConfig};
use crate::logger;
use crate::sheet::{rows_to_objects, CellRef, CellValue, RowObject, SliReading};
use crate::store::{SpreadsheetStore, StoreError};

pub const SHEET_NOT_FOUND: &str = "Sheet not found";

/// Read-side settings taken from the spreadsheet config
#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub default_sheet: Option<String>,
    pub sli_cell: CellRef,
    pub format: ReadFormat,
}

impl From<&SpreadsheetConfig> for ReadOptions {
    fn from(config: &SpreadsheetConfig) -> Self {
        Self {
            default_sheet: config.default_sheet.clone(),
            sli_cell: config.sli_cell,
            format: config.read_format,
        }
    }
}

/// Every body the read path can produce
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReadResponse {
    Sheets { sheets: Vec<String>, url: String },
    Error { error: &'static str },
    WithSli { sli: CellValue, data: Vec<RowObject> },
    Rows(Vec<RowObject>),
    Summary(PaymentSummary),
    LandedCost(LandedCost),
}

impl ReadResponse {
    const fn sheet_not_found() -> Self {
        Self::Error {
            error: SHEET_NOT_FOUND,
        }
    }
}

/// Serve one GET
///
/// A missing sheet is a normal response, not an error.
pub async fn read(
    store: &dyn SpreadsheetStore,
    options: &ReadOptions,
    query: &RequestQuery,
) -> Result<ReadResponse, StoreError> {
    let action = query.action();
    if action == ReadAction::ListSheets {
        return list_sheets(store).await;
    }

    let Some(sheet) = resolve_sheet(
        store,
        query.sheet.as_deref(),
        options.default_sheet.as_deref(),
    )
    .await?
    else {
        return Ok(ReadResponse::sheet_not_found());
    };

    // The sheet can disappear between resolving and reading it
    match read_sheet(store, options, action, &sheet).await {
        Err(StoreError::SheetNotFound(_)) => Ok(ReadResponse::sheet_not_found()),
        other => other,
    }
}

async fn list_sheets(store: &dyn SpreadsheetStore) -> Result<ReadResponse, StoreError> {
    let (sheets, url) = store.sheets_and_url().await?;
    Ok(ReadResponse::Sheets { sheets, url })
}

async fn read_sheet(
    store: &dyn SpreadsheetStore,
    options: &ReadOptions,
    action: ReadAction,
    sheet: &str,
) -> Result<ReadResponse, StoreError> {
    let values = store.read_values(sheet).await?;
    let data = rows_to_objects(&values);

    let response = match action {
        ReadAction::Summary => ReadResponse::Summary(summarize(&data)),
        ReadAction::LandedCost => {
            let sli = read_sli(store, sheet, &values, options.sli_cell).await;
            ReadResponse::LandedCost(landed_cost(&data, sli.as_f64().unwrap_or(0.0)))
        }
        ReadAction::Rows | ReadAction::ListSheets => match options.format {
            ReadFormat::Rows => ReadResponse::Rows(data),
            ReadFormat::WithSli => ReadResponse::WithSli {
                sli: read_sli(store, sheet, &values, options.sli_cell).await,
                data,
            },
        },
    };
    Ok(response)
}

/// SLI value, or `0` when the cell cannot be read
///
/// The used range is tried first; a sheet too small to contain the cell
/// gets a direct single-cell read.
async fn read_sli(
    store: &dyn SpreadsheetStore,
    sheet: &str,
    values: &[Vec<CellValue>],
    cell: CellRef,
) -> CellValue {
    let reading = match SliReading::from_range(values, cell) {
        SliReading::Absent => match store.read_cell(sheet, cell).await {
            Ok(value) => SliReading::Present(value),
            Err(e) => SliReading::Failed(e),
        },
        reading => reading,
    };

    if let SliReading::Failed(ref e) = reading {
        logger::log_warning(&format!("SLI cell {cell} on '{sheet}' unreadable, using 0: {e}"));
    }
    reading.value_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Sheet, Workbook};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    fn workbook() -> Workbook {
        let mut lista = vec![row(&["Producto", "Cantidad", "Precio Unitario"])];
        lista.push(row(&["Silla", "10", "5"]));
        lista.push(row(&["", "", "note"]));
        lista.push(vec![
            CellValue::text("Mesa"),
            CellValue::Number(2.0),
            CellValue::Number(25.0),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Number(25.0),
        ]);

        Workbook {
            url: "memory://book".to_string(),
            sheets: vec![
                Sheet {
                    name: "Pagos".to_string(),
                    rows: vec![row(&["A", "B"]), row(&["1", "2"])],
                },
                Sheet {
                    name: "Lista".to_string(),
                    rows: lista,
                },
            ],
        }
    }

    fn options(format: ReadFormat) -> ReadOptions {
        ReadOptions {
            default_sheet: None,
            sli_cell: CellRef::new(3, 8),
            format,
        }
    }

    fn query(action: Option<&str>, sheet: Option<&str>) -> RequestQuery {
        RequestQuery {
            action: action.map(String::from),
            sheet: sheet.map(String::from),
        }
    }

    async fn read_json(store: &dyn SpreadsheetStore, opts: &ReadOptions, q: &RequestQuery) -> String {
        let response = read(store, opts, q).await.unwrap();
        serde_json::to_string(&response).unwrap()
    }

    #[tokio::test]
    async fn test_list_sheets() {
        let store = MemoryStore::new(workbook());
        let json = read_json(&store, &options(ReadFormat::WithSli), &query(Some("listSheets"), None)).await;
        assert_eq!(json, r#"{"sheets":["Pagos","Lista"],"url":"memory://book"}"#);
    }

    #[tokio::test]
    async fn test_missing_sheet_is_error_object() {
        let store = MemoryStore::new(workbook());
        let json = read_json(&store, &options(ReadFormat::WithSli), &query(None, Some("Nope"))).await;
        assert_eq!(json, r#"{"error":"Sheet not found"}"#);
    }

    #[tokio::test]
    async fn test_sli_from_used_range_and_blank_rows_skipped() {
        let store = MemoryStore::new(workbook());
        let response = read(&store, &options(ReadFormat::WithSli), &query(None, Some("Lista")))
            .await
            .unwrap();
        let ReadResponse::WithSli { sli, data } = response else {
            panic!("expected sli response");
        };
        assert_eq!(sli, CellValue::Number(25.0));
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].get("Producto"), Some(&CellValue::text("Mesa")));
    }

    #[tokio::test]
    async fn test_small_sheet_falls_back_to_cell_read() {
        let store = MemoryStore::new(workbook());
        let json = read_json(&store, &options(ReadFormat::WithSli), &query(None, Some("Pagos"))).await;
        assert_eq!(json, r#"{"sli":"","data":[{"A":"1","B":"2"}]}"#);
    }

    #[tokio::test]
    async fn test_rows_format_defaults_to_first_sheet() {
        let store = MemoryStore::new(workbook());
        let json = read_json(&store, &options(ReadFormat::Rows), &query(None, None)).await;
        assert_eq!(json, r#"[{"A":"1","B":"2"}]"#);
    }

    #[tokio::test]
    async fn test_landed_cost_uses_sli() {
        let store = MemoryStore::new(workbook());
        let response = read(&store, &options(ReadFormat::Rows), &query(Some("landedCost"), Some("Lista")))
            .await
            .unwrap();
        let ReadResponse::LandedCost(result) = response else {
            panic!("expected landed cost");
        };
        assert!((result.total_fob - 100.0).abs() < 1e-9);
        assert!((result.factor - 0.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_summary_action() {
        let store = MemoryStore::new(workbook());
        let json = read_json(&store, &options(ReadFormat::Rows), &query(Some("summary"), None)).await;
        assert!(json.contains(r#""totals""#));
    }

    /// Memory store whose single-cell reads always fail
    struct BrokenCellStore(MemoryStore);

    #[async_trait]
    impl SpreadsheetStore for BrokenCellStore {
        async fn sheet_names(&self) -> Result<Vec<String>, StoreError> {
            self.0.sheet_names().await
        }
        async fn url(&self) -> Result<String, StoreError> {
            self.0.url().await
        }
        async fn read_values(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
            self.0.read_values(sheet).await
        }
        async fn read_cell(&self, _sheet: &str, _cell: CellRef) -> Result<CellValue, StoreError> {
            Err(StoreError::Api {
                status: 500,
                message: "backend error".to_string(),
            })
        }
        async fn append_row(&self, sheet: &str, row: Vec<CellValue>) -> Result<(), StoreError> {
            self.0.append_row(sheet, row).await
        }
    }

    /// Memory store whose single-cell reads return a fixed value
    struct FixedCellStore(MemoryStore, CellValue);

    #[async_trait]
    impl SpreadsheetStore for FixedCellStore {
        async fn sheet_names(&self) -> Result<Vec<String>, StoreError> {
            self.0.sheet_names().await
        }
        async fn url(&self) -> Result<String, StoreError> {
            self.0.url().await
        }
        async fn read_values(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
            self.0.read_values(sheet).await
        }
        async fn read_cell(&self, _sheet: &str, _cell: CellRef) -> Result<CellValue, StoreError> {
            Ok(self.1.clone())
        }
        async fn append_row(&self, sheet: &str, row: Vec<CellValue>) -> Result<(), StoreError> {
            self.0.append_row(sheet, row).await
        }
    }

    #[tokio::test]
    async fn test_small_sheet_sli_comes_from_cell_read() {
        let store = FixedCellStore(MemoryStore::new(workbook()), CellValue::Number(42.0));
        let json = read_json(&store, &options(ReadFormat::WithSli), &query(None, Some("Pagos"))).await;
        assert_eq!(json, r#"{"sli":42,"data":[{"A":"1","B":"2"}]}"#);

        // Sheets large enough to hold the cell never need the extra read
        let response = read(&store, &options(ReadFormat::WithSli), &query(None, Some("Lista")))
            .await
            .unwrap();
        let ReadResponse::WithSli { sli, .. } = response else {
            panic!("expected sli response");
        };
        assert_eq!(sli, CellValue::Number(25.0));
    }

    #[tokio::test]
    async fn test_failed_cell_read_yields_zero() {
        let store = BrokenCellStore(MemoryStore::new(workbook()));
        let json = read_json(&store, &options(ReadFormat::WithSli), &query(None, Some("Pagos"))).await;
        assert_eq!(json, r#"{"sli":0,"data":[{"A":"1","B":"2"}]}"#);
    }

    /// Memory store that only answers metadata through `sheets_and_url`
    struct SingleFetchStore {
        inner: MemoryStore,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl SpreadsheetStore for SingleFetchStore {
        async fn sheet_names(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Config("separate sheet listing".to_string()))
        }
        async fn url(&self) -> Result<String, StoreError> {
            Err(StoreError::Config("separate url lookup".to_string()))
        }
        async fn sheets_and_url(&self) -> Result<(Vec<String>, String), StoreError> {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            Ok((self.inner.sheet_names().await?, self.inner.url().await?))
        }
        async fn read_values(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
            self.inner.read_values(sheet).await
        }
        async fn read_cell(&self, sheet: &str, cell: CellRef) -> Result<CellValue, StoreError> {
            self.inner.read_cell(sheet, cell).await
        }
        async fn append_row(&self, sheet: &str, row: Vec<CellValue>) -> Result<(), StoreError> {
            self.inner.append_row(sheet, row).await
        }
    }

    #[tokio::test]
    async fn test_list_sheets_fetches_metadata_once() {
        let store = SingleFetchStore {
            inner: MemoryStore::new(workbook()),
            fetches: AtomicUsize::new(0),
        };
        let json = read_json(&store, &options(ReadFormat::WithSli), &query(Some("listSheets"), None)).await;
        assert_eq!(json, r#"{"sheets":["Pagos","Lista"],"url":"memory://book"}"#);
        assert_eq!(store.fetches.load(Ordering::Relaxed), 1);
    }

    /// Store that cannot list sheets
    struct DownStore;

    #[async_trait]
    impl SpreadsheetStore for DownStore {
        async fn sheet_names(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Config("offline".to_string()))
        }
        async fn url(&self) -> Result<String, StoreError> {
            Err(StoreError::Config("offline".to_string()))
        }
        async fn read_values(&self, _sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
            Err(StoreError::Config("offline".to_string()))
        }
        async fn read_cell(&self, _sheet: &str, _cell: CellRef) -> Result<CellValue, StoreError> {
            Err(StoreError::Config("offline".to_string()))
        }
        async fn append_row(&self, _sheet: &str, _row: Vec<CellValue>) -> Result<(), StoreError> {
            Err(StoreError::Config("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let result = read(&DownStore, &options(ReadFormat::WithSli), &query(None, None)).await;
        assert!(matches!(result, Err(StoreError::Config(_))));
    }
}
