use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    // Build the Tokio runtime, sizing the thread pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = config::AppState::new(cfg)?;
    log_server_start(&state, &addr);

    // Connection tasks use spawn_local, so run inside a LocalSet
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run_server_loop(listener, Arc::clone(&state)))
        .await
}

fn log_server_start(state: &Arc<config::AppState>, addr: &std::net::SocketAddr) {
    state.log.write("======================================");
    state.log.write("Server started");
    state.log.write(&format!("Listening on: http://{addr}"));
    state
        .log
        .write(&format!("Log file: {}", state.log.path().display()));
    if let Some(workers) = state.config.server.workers {
        state.log.write(&format!("Worker threads: {workers}"));
    }
    if let Some(max) = state.config.performance.max_connections {
        state.log.write(&format!("Max connections: {max}"));
    }
    state.log.write("======================================");
}
