//! Request handler module
//!
//! Routing dispatch plus the per-path content handlers.

pub mod admin;
pub mod forms;
pub mod pages;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
