//! Admin surface: dashboard, raw log view, and control actions.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::sync::Arc;

use crate::config::AppState;
use crate::error::{AppError, Result};
use crate::http::{build_html_response, build_plain_response};

use super::forms::parse_urlencoded;
use super::pages;

/// GET `/admin`: log contents plus the stop/clear control forms.
pub fn handle_dashboard(state: &Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    build_html_response(pages::admin_page(&state.log))
}

/// GET `/logs`: raw log file contents as plain text.
pub fn handle_logs(state: &Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let contents = state.log.read_all()?;
    build_plain_response(contents)
}

/// POST `/admin/action`: dispatch on the `action` field of the URL-encoded
/// body.
///
/// `stop_server` only signals shutdown here; the accept loop stops and then
/// drains in-flight connections, so the confirmation response is fully
/// written before the listener goes away. An unrecognized action is an
/// explicit error (and becomes a 500) instead of leaving the client without
/// a response.
pub fn handle_action(state: &Arc<AppState>, body: &[u8]) -> Result<Response<Full<Bytes>>> {
    let fields = parse_urlencoded(&String::from_utf8_lossy(body));
    let action = fields.get("action").map_or("", String::as_str);

    match action {
        "stop_server" => {
            state.log.write("Admin action: stop_server");
            let response = build_html_response(pages::echo_page(
                "Stopping",
                "Server is shutting down.",
            ))?;
            state.shutdown.notify_one();
            Ok(response)
        }
        "clear_logs" => {
            // Log before truncating: the file must be empty once the
            // confirmation response goes out.
            state.log.write("Admin action: clear_logs");
            state.log.clear()?;
            build_html_response(pages::echo_page("Logs cleared", "Log file truncated."))
        }
        other => Err(AppError::UnknownAction(other.to_string())),
    }
}
