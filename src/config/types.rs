// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

use crate::sheet::{CellRef, PAYMENT_FIELDS};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub health: HealthConfig,
    pub spreadsheet: SpreadsheetConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Path the read/write endpoint is served on
    pub endpoint_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
            endpoint_path: "/".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds to wait for open connections after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
            shutdown_timeout: 10,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: "sheetgate".to_string(),
            enable_cors: true,
            max_body_size: 1_048_576,
        }
    }
}

/// Health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Which spreadsheet store to use
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
    Google,
}

/// Shape of a plain GET response
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadFormat {
    /// Bare array of row objects
    Rows,
    /// `{"sli": ..., "data": [...]}`
    #[default]
    WithSli,
}

/// Spreadsheet store and endpoint behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct SpreadsheetConfig {
    pub backend: StoreBackend,
    /// Workbook file for the `file` backend
    pub path: String,
    /// URL reported by `listSheets` (memory/file backends)
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    pub api_base: String,
    /// Seconds before a Sheets API call is abandoned
    pub request_timeout: u64,
    /// Sheet used when a request names none (first sheet if unset)
    #[serde(default)]
    pub default_sheet: Option<String>,
    pub sli_cell: CellRef,
    pub read_format: ReadFormat,
    /// Reject writes when the sheet's headers differ from `write_headers`
    pub check_write_headers: bool,
    pub write_headers: Vec<String>,
}

pub fn default_write_headers() -> Vec<String> {
    PAYMENT_FIELDS.iter().map(|f| f.to_uppercase()).collect()
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: "workbook.json".to_string(),
            url: None,
            spreadsheet_id: None,
            access_token: None,
            api_base: "https://sheets.googleapis.com/v4".to_string(),
            request_timeout: 30,
            default_sheet: None,
            sli_cell: CellRef::new(3, 8),
            read_format: ReadFormat::default(),
            check_write_headers: false,
            write_headers: default_write_headers(),
        }
    }
}
