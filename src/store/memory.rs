// In-process store backed by a workbook behind an async lock

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::workbook::Workbook;
use super::{SpreadsheetStore, StoreError};
use crate::sheet::{CellRef, CellValue};

pub struct MemoryStore {
    workbook: RwLock<Workbook>,
}

impl MemoryStore {
    pub fn new(workbook: Workbook) -> Self {
        Self {
            workbook: RwLock::new(workbook),
        }
    }

    /// Copy of the current workbook
    #[cfg(test)]
    pub async fn snapshot(&self) -> Workbook {
        self.workbook.read().await.clone()
    }
}

#[async_trait]
impl SpreadsheetStore for MemoryStore {
    async fn sheet_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.workbook.read().await.names())
    }

    async fn url(&self) -> Result<String, StoreError> {
        Ok(self.workbook.read().await.url.clone())
    }

    async fn read_values(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
        Ok(self.workbook.read().await.sheet(sheet)?.used_range())
    }

    async fn read_cell(&self, sheet: &str, cell: CellRef) -> Result<CellValue, StoreError> {
        Ok(self.workbook.read().await.sheet(sheet)?.cell(cell))
    }

    async fn append_row(&self, sheet: &str, row: Vec<CellValue>) -> Result<(), StoreError> {
        self.workbook.write().await.sheet_mut(sheet)?.append(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_then_read() {
        let store = MemoryStore::new(Workbook::with_sheet(
            "memory://t",
            "Pagos",
            &["A".to_string(), "B".to_string()],
        ));
        store
            .append_row("Pagos", vec![CellValue::text("x"), CellValue::text("y")])
            .await
            .unwrap();

        let values = store.read_values("Pagos").await.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1][1], CellValue::text("y"));
        assert_eq!(store.sheet_names().await.unwrap(), vec!["Pagos".to_string()]);
        assert_eq!(store.url().await.unwrap(), "memory://t");
    }

    #[tokio::test]
    async fn test_missing_sheet() {
        let store = MemoryStore::new(Workbook::with_sheet("memory://t", "Pagos", &[]));
        assert!(matches!(
            store.append_row("Nope", vec![]).await,
            Err(StoreError::SheetNotFound(_))
        ));
        assert!(matches!(
            store.read_cell("Nope", CellRef::new(0, 0)).await,
            Err(StoreError::SheetNotFound(_))
        ));
    }
}
