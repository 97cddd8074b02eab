//! Error types for the HTTP server.

use std::net::AddrParseError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hads_index::IndexError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Nothing to serve at the given route.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// A resolved file could not be read.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Modification requested while the root is read-only.
    #[error("Read-only mode: {0} cannot be modified")]
    ReadOnly(String),

    /// Malformed request body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Invalid address: {0}")]
    Address(#[from] AddrParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(route) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "route": route}),
            ),
            Self::FileNotFound(route) => (
                StatusCode::NOT_FOUND,
                json!({"error": "File not found", "route": route}),
            ),
            Self::ReadOnly(route) => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({"error": "Read-only mode", "route": route}),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({"error": message})),
            Self::Index(_) | Self::Address(_) | Self::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
