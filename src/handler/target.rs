// Target sheet resolution
// Order: requested name, configured default, first sheet in the workbook

use crate::store::{SpreadsheetStore, StoreError};

/// Name of the sheet a request operates on
///
/// `Ok(None)` means the requested sheet does not exist, or the workbook
/// has no sheets at all.
pub async fn resolve_sheet(
    store: &dyn SpreadsheetStore,
    requested: Option<&str>,
    default: Option<&str>,
) -> Result<Option<String>, StoreError> {
    let names = store.sheet_names().await?;

    let resolved = match requested.or(default) {
        Some(name) => names.into_iter().find(|n| n == name),
        None => names.into_iter().next(),
    };
    Ok(resolved)
}
