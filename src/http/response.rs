//! HTTP response building module
//!
//! Every success builder sets `Content-Type` and a `Content-Length` equal to
//! the exact byte length of the UTF-8 body.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::error::{AppError, Result};

/// Build a 200 HTML response.
pub fn build_html_response(html: String) -> Result<Response<Full<Bytes>>> {
    let body = Bytes::from(html);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", body.len())
        .body(Full::new(body))?;
    Ok(response)
}

/// Build a 200 plain-text response.
pub fn build_plain_response(text: String) -> Result<Response<Full<Bytes>>> {
    let body = Bytes::from(text);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", body.len())
        .body(Full::new(body))?;
    Ok(response)
}

/// Build the error response for a failed request.
///
/// The body is only the short status phrase; error detail stays server-side
/// in the log. `Connection: close` tears the stream down once the response
/// is written, the success path leaves connection lifecycle to keep-alive.
pub fn build_error_response(err: &AppError) -> Response<Full<Bytes>> {
    let body = Bytes::from(err.phrase());
    Response::builder()
        .status(err.status_code())
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", body.len())
        .header("Connection", "close")
        .body(Full::new(body))
        .unwrap_or_else(|_| {
            let mut fallback = Response::new(Full::new(Bytes::from("Internal Server Error")));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}
