// Server module entry
// Listener setup, the accept/dispatch loop, and per-connection handling.

pub mod connection;
pub mod listener;

// Rust does not allow `loop` as a module name (keyword), so use server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_reusable_listener;
pub use server_loop::run_server_loop;
