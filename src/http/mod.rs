//! HTTP protocol layer module
//!
//! Response construction, decoupled from routing and business logic.

pub mod response;

pub use response::{build_error_response, build_html_response, build_plain_response};
