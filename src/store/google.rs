//! Google Sheets REST API (v4) backend
//!
//! Sheet listing and the spreadsheet URL come from `spreadsheets.get`, ranges
//! from `values.get` and appends go through `values.append`. Requests carry a
//! bearer access token taken from configuration.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::{SpreadsheetStore, StoreError};
use crate::config::SpreadsheetConfig;
use crate::logger;
use crate::sheet::{CellRef, CellValue};

pub struct GoogleSheetsStore {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetMeta {
    #[serde(default)]
    spreadsheet_url: String,
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

impl SpreadsheetMeta {
    /// Sheet titles and URL, with the edit link as fallback when the URL is absent
    fn into_parts(self, spreadsheet_id: &str) -> (Vec<String>, String) {
        let names = self.sheets.into_iter().map(|s| s.properties.title).collect();
        let url = if self.spreadsheet_url.is_empty() {
            format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit")
        } else {
            self.spreadsheet_url
        };
        (names, url)
    }
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl GoogleSheetsStore {
    pub fn from_config(config: &SpreadsheetConfig) -> Result<Self, StoreError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                StoreError::Config("spreadsheet.spreadsheet_id is required for google".into())
            })?;
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                StoreError::Config("spreadsheet.access_token is required for google".into())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id,
            access_token,
        })
    }

    fn metadata_url(&self) -> Result<Url, StoreError> {
        let mut url = spreadsheet_url(&self.api_base, &self.spreadsheet_id, &[])?;
        url.query_pairs_mut()
            .append_pair("fields", "spreadsheetUrl,sheets.properties.title");
        Ok(url)
    }

    async fn metadata(&self) -> Result<SpreadsheetMeta, StoreError> {
        let url = self.metadata_url()?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body = check_status(response, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_range(&self, sheet: &str, range: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
        let mut url = spreadsheet_url(&self.api_base, &self.spreadsheet_id, &["values", range])?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "FORMATTED_STRING");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body = check_status(response, Some(sheet)).await?;
        parse_value_range(&body)
    }
}

/// `{base}/spreadsheets/{id}/{segments...}` with each segment percent-encoded
fn spreadsheet_url(base: &str, id: &str, segments: &[&str]) -> Result<Url, StoreError> {
    let mut url = Url::parse(base)
        .map_err(|e| StoreError::Config(format!("Invalid api_base '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| StoreError::Config(format!("api_base '{base}' cannot be a base URL")))?
        .pop_if_empty()
        .push("spreadsheets")
        .push(id)
        .extend(segments);
    Ok(url)
}

/// A1 range covering a whole sheet, with the name quoted
fn sheet_range(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

fn cell_range(sheet: &str, cell: CellRef) -> String {
    format!("{}!{cell}", sheet_range(sheet))
}

fn parse_value_range(body: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
    let range: ValueRange = serde_json::from_str(body)?;
    Ok(range
        .values
        .into_iter()
        .map(|row| row.into_iter().map(CellValue::from).collect())
        .collect())
}

/// Turn non-2xx responses into errors; an unparseable range means the sheet is missing
async fn check_status(
    response: reqwest::Response,
    sheet: Option<&str>,
) -> Result<String, StoreError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    Err(api_error(status.as_u16(), &body, sheet))
}

fn api_error(status: u16, body: &str, sheet: Option<&str>) -> StoreError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map_or_else(|_| body.chars().take(200).collect(), |b| b.error.message);

    if let Some(sheet) = sheet {
        if status == 400 && message.contains("Unable to parse range") {
            return StoreError::SheetNotFound(sheet.to_string());
        }
    }
    logger::log_error(&format!("[STORE] Sheets API error {status}: {message}"));
    StoreError::Api { status, message }
}

#[async_trait]
impl SpreadsheetStore for GoogleSheetsStore {
    async fn sheet_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.sheets_and_url().await?.0)
    }

    async fn url(&self) -> Result<String, StoreError> {
        Ok(self.sheets_and_url().await?.1)
    }

    /// One `spreadsheets.get` covers both
    async fn sheets_and_url(&self) -> Result<(Vec<String>, String), StoreError> {
        Ok(self.metadata().await?.into_parts(&self.spreadsheet_id))
    }

    async fn read_values(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
        self.get_range(sheet, &sheet_range(sheet)).await
    }

    async fn read_cell(&self, sheet: &str, cell: CellRef) -> Result<CellValue, StoreError> {
        let values = self.get_range(sheet, &cell_range(sheet, cell)).await?;
        Ok(values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or_default())
    }

    async fn append_row(&self, sheet: &str, row: Vec<CellValue>) -> Result<(), StoreError> {
        let append = format!("{}:append", sheet_range(sheet));
        let mut url = spreadsheet_url(&self.api_base, &self.spreadsheet_id, &["values", &append])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let cells: Vec<serde_json::Value> = row.iter().map(CellValue::to_json).collect();
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "values": [cells] }))
            .send()
            .await?;
        check_status(response, Some(sheet)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://sheets.googleapis.com/v4";

    #[test]
    fn test_values_url_encodes_sheet_names() {
        let url = spreadsheet_url(BASE, "abc123", &["values", &sheet_range("Packing List")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/'Packing%20List'"
        );
    }

    #[test]
    fn test_cell_range_quotes_apostrophes() {
        assert_eq!(cell_range("Juan's", CellRef::new(3, 8)), "'Juan''s'!I4");
    }

    #[test]
    fn test_append_url() {
        let append = format!("{}:append", sheet_range("Pagos"));
        let url = spreadsheet_url(&format!("{BASE}/"), "id", &["values", &append]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/id/values/'Pagos':append"
        );
    }

    #[test]
    fn test_parse_value_range() {
        let body = r#"{"range":"'S'!A1:C2","majorDimension":"ROWS",
                       "values":[["A","B","C"],["x",2]]}"#;
        let values = parse_value_range(body).unwrap();
        assert_eq!(values[0].len(), 3);
        assert_eq!(values[1], vec![CellValue::text("x"), CellValue::Number(2.0)]);
    }

    #[test]
    fn test_parse_empty_value_range() {
        let values = parse_value_range(r#"{"range":"'S'!I4","majorDimension":"ROWS"}"#).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_unparseable_range_is_missing_sheet() {
        let body = r#"{"error":{"code":400,"message":"Unable to parse range: 'Nope'","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            api_error(400, body, Some("Nope")),
            StoreError::SheetNotFound(s) if s == "Nope"
        ));
        assert!(matches!(
            api_error(403, r#"{"error":{"message":"denied"}}"#, Some("Nope")),
            StoreError::Api { status: 403, .. }
        ));
    }

    #[test]
    fn test_metadata_gives_names_and_url() {
        let body = r#"{"spreadsheetUrl":"https://docs.google.com/spreadsheets/d/abc/edit#gid=0",
                       "sheets":[{"properties":{"title":"Pagos"}},{"properties":{"title":"Lista"}}]}"#;
        let meta: SpreadsheetMeta = serde_json::from_str(body).unwrap();
        let (names, url) = meta.into_parts("abc");
        assert_eq!(names, vec!["Pagos".to_string(), "Lista".to_string()]);
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/abc/edit#gid=0");

        let meta: SpreadsheetMeta = serde_json::from_str(r#"{"sheets":[]}"#).unwrap();
        let (names, url) = meta.into_parts("xyz");
        assert!(names.is_empty());
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/xyz/edit");
    }

    #[test]
    fn test_requires_id_and_token() {
        let mut config = SpreadsheetConfig::default();
        assert!(matches!(
            GoogleSheetsStore::from_config(&config),
            Err(StoreError::Config(_))
        ));
        config.spreadsheet_id = Some("id".to_string());
        config.access_token = Some("token".to_string());
        assert!(GoogleSheetsStore::from_config(&config).is_ok());
    }
}
