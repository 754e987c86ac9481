//! Error taxonomy and the structured JSON error body.
//!
//! Provider non-2xx responses are deliberately not represented here: the
//! proxy gateway passes their status and body through verbatim so browser
//! callers can interpret GitHub-specific error codes. Only proxy-originated
//! failures become a `ProxyError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProxyError>;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authorization header required")]
    Unauthorized,

    #[error("Method {0} not supported")]
    MethodNotAllowed(String),

    #[error("Endpoint not found")]
    NotFound,

    #[error("GitHub unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::ProviderUnreachable(_) | ProxyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        // Transport and decode failures alike: the caller only ever sees the
        // string form, never the upstream exception object.
        ProxyError::ProviderUnreachable(err.to_string())
    }
}

/// JSON body attached to every proxy-originated error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub status: u16,
    pub message: String,
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self {
            error: true,
            status: status.as_u16(),
            message,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody::new(status, self.to_string()))).into_response()
    }
}
