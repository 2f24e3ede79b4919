// Server loop module
// Accepts connections until shutdown is signalled, then drains open ones

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop for the endpoint
///
/// Must run inside a `LocalSet`: connections are spawned with `spawn_local`.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = signals.shutdown.notified() => break,
        }
    }

    // Stop accepting before waiting on the open connections
    drop(listener);

    let active = state.active_connections.load(Ordering::SeqCst);
    logger::log_shutdown(active);
    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    if drain_connections(&state, grace).await {
        logger::log_info("[Shutdown] All connections closed");
    } else {
        logger::log_warning(&format!(
            "[Shutdown] {} connection(s) still open after {}s, exiting anyway",
            state.active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        ));
    }
    Ok(())
}

/// Wait for the active connection count to reach zero, up to `grace`
///
/// Returns whether every connection closed in time.
async fn drain_connections(state: &AppState, grace: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        if state.active_connections.load(Ordering::SeqCst) == 0 {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{MemoryStore, SharedStore, Workbook};

    fn state() -> Arc<AppState> {
        let store: SharedStore = Arc::new(MemoryStore::new(Workbook::with_sheet(
            "memory://t",
            "Sheet1",
            &[],
        )));
        Arc::new(AppState::new(&Config::default(), store))
    }

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        assert!(drain_connections(&state(), Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let state = state();
        state.active_connections.store(1, Ordering::SeqCst);
        assert!(!drain_connections(&state, Duration::from_millis(120)).await);
    }

    #[tokio::test]
    async fn test_loop_exits_on_shutdown() {
        let listener = super::super::create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let signals = Arc::new(SignalHandler::new());
        signals.trigger();
        let local = tokio::task::LocalSet::new();
        local
            .run_until(start_server_loop(listener, state(), signals))
            .await
            .unwrap();
    }
}
