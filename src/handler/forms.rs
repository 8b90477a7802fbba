//! POST body handlers for `/contact`
//!
//! One handler per supported content type. Decode failures are not
//! recovered here; they propagate to the funnel in `router` and come back
//! as a 500.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::collections::BTreeMap;

use crate::error::{AppError, Result};
use crate::http::build_html_response;

use super::pages;

/// JSON handler: decode the body as a flat string-to-string mapping and
/// echo it back pretty-printed inside an HTML page. A malformed body or a
/// non-string value fails the whole request.
pub fn handle_json(body: &[u8]) -> Result<Response<Full<Bytes>>> {
    let fields: BTreeMap<String, String> = serde_json::from_slice(body)?;
    let pretty = serde_json::to_string_pretty(&fields)?;
    build_html_response(pages::echo_page("JSON received", &pretty))
}

/// Multipart handler: requires a `boundary=` parameter on the content-type,
/// then echoes the raw body verbatim.
///
/// The body is deliberately not split into parts; until a real multipart
/// decoder exists, callers must not assume structured fields come out of
/// this endpoint.
pub fn handle_multipart(content_type: &str, body: &[u8]) -> Result<Response<Full<Bytes>>> {
    let _boundary = extract_boundary(content_type)?;
    let raw = String::from_utf8_lossy(body);
    build_html_response(pages::echo_page("Upload received", &raw))
}

/// URL-encoded form handler: parses the body as percent-encoded pairs, then
/// echoes the raw body back.
pub fn handle_urlencoded(body: &[u8]) -> Result<Response<Full<Bytes>>> {
    let raw = String::from_utf8_lossy(body);
    let _fields = parse_urlencoded(&raw);
    build_html_response(pages::echo_page("Form received", &raw))
}

/// Extract the boundary token from a `multipart/form-data` content-type.
///
/// Fails rather than proceeding with a default when the parameter is
/// absent.
pub fn extract_boundary(content_type: &str) -> Result<&str> {
    let start = content_type
        .find("boundary=")
        .ok_or_else(|| AppError::MissingBoundary(content_type.to_string()))?;
    let token = &content_type[start + "boundary=".len()..];
    let token = token.split(';').next().unwrap_or(token).trim();
    let token = token.trim_matches('"');
    if token.is_empty() {
        return Err(AppError::MissingBoundary(content_type.to_string()));
    }
    Ok(token)
}

/// Parse a query-string-style body into key/value pairs.
///
/// Pairs are `&`-separated, keys and values percent-decoded, `+` decoded as
/// space. A pair without `=` becomes a key with an empty value.
pub fn parse_urlencoded(body: &str) -> BTreeMap<String, String> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (percent_decode(key), percent_decode(value)),
            None => (percent_decode(pair), String::new()),
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = [bytes[i + 1], bytes[i + 2]];
                let decoded = std::str::from_utf8(&hex)
                    .ok()
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok());
                if let Some(byte) = decoded {
                    out.push(byte);
                    i += 3;
                } else {
                    // Invalid escape stays literal.
                    out.push(b'%');
                    i += 1;
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
