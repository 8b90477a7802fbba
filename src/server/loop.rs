// Server loop module
// The dispatch loop: accept connections until the shutdown signal fires,
// then drain in-flight connections before returning.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;

/// How long the drain waits for in-flight connections after shutdown.
const DRAIN_DEADLINE: Duration = Duration::from_secs(5);
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `AppState::shutdown` is signaled.
///
/// Each accepted connection is handed to its own task (bounded by
/// `performance.max_connections`). On shutdown the listener stops accepting
/// first, then in-flight connections get a bounded grace period; the
/// connection that carried the `stop_server` request is itself in-flight,
/// which guarantees its confirmation response is written before the
/// listener is dropped.
pub async fn run_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => {
                        state.log.log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = state.shutdown.notified() => {
                state.log.write("Shutdown signal received, draining connections");
                break;
            }
        }
    }

    drain_connections(&state).await;
    state.log.write("Server stopped");
    drop(listener);
    Ok(())
}

/// Wait for the in-flight connection count to reach zero, bounded by the
/// drain deadline so a stalled client cannot hold shutdown hostage.
async fn drain_connections(state: &Arc<AppState>) {
    let deadline = tokio::time::Instant::now() + DRAIN_DEADLINE;
    loop {
        let in_flight = state.active_connections.load(Ordering::SeqCst);
        if in_flight == 0 {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            state.log.log_warning(&format!(
                "Drain deadline reached with {in_flight} connections still active"
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, LoggingConfig, PerformanceConfig, ServerConfig};
    use crate::server::create_reusable_listener;

    fn test_state(dir: &tempfile::TempDir) -> Arc<AppState> {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                workers: None,
            },
            logging: LoggingConfig {
                log_file: dir
                    .path()
                    .join("server.log")
                    .to_string_lossy()
                    .into_owned(),
                access_log: false,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 0,
                read_timeout: 1,
                write_timeout: 1,
                max_connections: Some(4),
            },
        };
        AppState::new(config).expect("state")
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();

        state.shutdown.notify_one();
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                tokio::time::timeout(
                    Duration::from_secs(2),
                    run_server_loop(listener, Arc::clone(&state)),
                )
                .await
                .expect("loop exits after shutdown")
                .expect("clean exit")
            })
            .await;

        let log = state.log.read_all().unwrap();
        assert!(log.contains("Server stopped"));
    }

    #[tokio::test]
    async fn drain_returns_once_counter_hits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state.active_connections.store(1, Ordering::SeqCst);

        let drainer = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { drain_connections(&state).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        state.active_connections.store(0, Ordering::SeqCst);

        tokio::time::timeout(Duration::from_secs(2), drainer)
            .await
            .expect("drain finished")
            .unwrap();
    }
}
