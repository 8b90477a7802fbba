use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger::LogSink;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Append-only log file, one timestamped line per entry.
    pub log_file: String,
    pub access_log: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    /// Concurrency ceiling; connections past it are rejected at accept.
    pub max_connections: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("CONTACTD"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.log_file", "server.log")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.max_connections", 1024)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Server context passed to the dispatch loop and every handler.
///
/// Holds the log sink and the shutdown signal explicitly so request handling
/// never reaches for ambient global state; the listener itself stays owned
/// by the server loop.
pub struct AppState {
    pub config: Config,
    pub log: LogSink,
    /// Signaled by the `stop_server` admin action.
    pub shutdown: Notify,
    /// In-flight connection count, shared between accept loop and tasks.
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> std::io::Result<Arc<Self>> {
        let log = LogSink::open(&config.logging.log_file)?;
        Ok(Arc::new(Self {
            config,
            log,
            shutdown: Notify::new(),
            active_connections: AtomicUsize::new(0),
        }))
    }
}
