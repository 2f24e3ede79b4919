// Application state module
// Shared by every connection: configuration, the spreadsheet store and cached flags

use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::sync::Arc;

use super::types::Config;
use crate::store::SharedStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,

    /// Connections currently being served
    pub active_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: &Config, store: SharedStore) -> Self {
        Self {
            config: config.clone(),
            store,
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }
}
