// JSON workbook file store
// Loads the workbook once and rewrites the file after every append.
// Appends save on the blocking pool; connections run on a LocalSet thread.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::workbook::Workbook;
use super::{SpreadsheetStore, StoreError};
use crate::logger;
use crate::sheet::{CellRef, CellValue};

pub struct FileStore {
    path: PathBuf,
    workbook: RwLock<Workbook>,
}

impl FileStore {
    /// Open the workbook at `path`, creating it with one sheet if missing
    ///
    /// The new sheet's first row is `headers`. `url` overrides the URL stored
    /// in the file; a file without one gets a `file://` URL.
    pub fn open(path: &str, url: Option<&str>, headers: &[String]) -> Result<Self, StoreError> {
        let path = PathBuf::from(path);

        let mut workbook = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let workbook: Workbook = serde_json::from_str(&content)?;
            workbook.validate()?;
            workbook
        } else {
            let workbook = Workbook::with_sheet(String::new(), "Sheet1", headers);
            save(&path, &workbook)?;
            logger::log_info(&format!("[STORE] Created workbook {}", path.display()));
            workbook
        };

        if let Some(url) = url {
            workbook.url = url.to_string();
        } else if workbook.url.is_empty() {
            let absolute = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            workbook.url = format!("file://{}", absolute.display());
        }

        Ok(Self {
            path,
            workbook: RwLock::new(workbook),
        })
    }
}

/// Write through a temporary file so readers never see a partial workbook
fn save(path: &Path, workbook: &Workbook) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(workbook)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl SpreadsheetStore for FileStore {
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
        let mut workbook = self.workbook.write().await;
        let previous = workbook.sheet(sheet)?.rows.clone();
        workbook.sheet_mut(sheet)?.append(row);

        if let Err(e) = save_in_background(self.path.clone(), (*workbook).clone()).await {
            // Keep memory and disk in step
            workbook.sheet_mut(sheet)?.rows = previous;
            return Err(e);
        }
        Ok(())
    }
}

/// `save` on the blocking pool, so the calling thread keeps serving connections
async fn save_in_background(path: PathBuf, workbook: Workbook) -> Result<(), StoreError> {
    tokio::task::spawn_blocking(move || save(&path, &workbook))
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
}
