// Configuration module entry point
// Loads configuration from file and environment, and holds runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{default_write_headers, Config, ReadFormat, SpreadsheetConfig, StoreBackend};

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `SHEETGATE_`-prefixed environment variables
    /// override it, with `__` separating nested keys
    /// (`SHEETGATE_SPREADSHEET__BACKEND=google`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SHEETGATE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("spreadsheet.write_headers"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.endpoint_path", "/")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("http.server_name", "sheetgate")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("spreadsheet.backend", "file")?
            .set_default("spreadsheet.path", "workbook.json")?
            .set_default("spreadsheet.api_base", "https://sheets.googleapis.com/v4")?
            .set_default("spreadsheet.request_timeout", 30)?
            .set_default("spreadsheet.sli_cell", "I4")?
            .set_default("spreadsheet.read_format", "with_sli")?
            .set_default("spreadsheet.check_write_headers", false)?
            .set_default("spreadsheet.write_headers", default_write_headers())?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate().map_err(config::ConfigError::Message)?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), String> {
        if !self.server.endpoint_path.starts_with('/') {
            return Err(format!(
                "server.endpoint_path must start with '/': {}",
                self.server.endpoint_path
            ));
        }
        if self.spreadsheet.check_write_headers && self.spreadsheet.write_headers.is_empty() {
            return Err("spreadsheet.write_headers is empty but check_write_headers is on".into());
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellRef;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/sheetgate").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.endpoint_path, "/");
        assert_eq!(cfg.spreadsheet.backend, StoreBackend::File);
        assert_eq!(cfg.spreadsheet.sli_cell, CellRef::new(3, 8));
        assert_eq!(cfg.spreadsheet.read_format, ReadFormat::WithSli);
        assert_eq!(cfg.spreadsheet.write_headers.len(), 7);
        assert_eq!(cfg.spreadsheet.write_headers[0], "FECHA_INGRESO");
        assert!(cfg.health.enabled);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::default();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);

        let mut bad = Config::default();
        bad.server.host = "not a host".to_string();
        assert!(bad.get_socket_addr().is_err());
    }

    #[test]
    fn test_validate_endpoint_path() {
        let mut cfg = Config::default();
        assert!(cfg.validate().is_ok());
        cfg.server.endpoint_path = "exec".to_string();
        assert!(cfg.validate().is_err());
    }
}
