//! Error taxonomy for request handling
//!
//! Every failure in a handler propagates to the single funnel in
//! `handler::handle_request`, which maps it to a status code. There is no
//! per-handler recovery.

use hyper::StatusCode;
use thiserror::Error;

/// Closed set of request-handling failures.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// JSON body failed to decode as a flat string-to-string mapping.
    #[error("JSON decode failed: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// A multipart content-type header without a `boundary=` parameter.
    #[error("Missing multipart boundary in content-type '{0}'")]
    MissingBoundary(String),

    /// `/admin/action` body carried an action we do not know.
    #[error("Unknown admin action '{0}'")]
    UnknownAction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read request body: {0}")]
    BodyRead(#[from] hyper::Error),

    #[error("Failed to build response: {0}")]
    ResponseBuild(#[from] hyper::http::Error),
}

impl AppError {
    /// Status code sent to the client for this failure.
    ///
    /// Everything past the three routing outcomes is an internal error; the
    /// client only ever sees the code and a short phrase, details go to the
    /// log.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::JsonDecode(_)
            | Self::MissingBoundary(_)
            | Self::UnknownAction(_)
            | Self::Io(_)
            | Self::BodyRead(_)
            | Self::ResponseBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short phrase used as the error response body.
    pub const fn phrase(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed(_) => "405 Method Not Allowed",
            Self::NotFound(_) => "404 Not Found",
            Self::UnsupportedMediaType(_) => "415 Unsupported Media Type",
            _ => "500 Internal Server Error",
        }
    }
}

/// Handler result type.
pub type Result<T> = std::result::Result<T, AppError>;

// Lets body-generic code accept infallible bodies (`Full<Bytes>` in tests).
impl From<std::convert::Infallible> for AppError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}
