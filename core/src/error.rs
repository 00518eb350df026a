//! Error types for the dashboard API client.
//!
//! # Design
//! Construction problems (bad base URL, badly typed options, credentials
//! that do not fit the auth method) surface as `Configuration` before any
//! request exists. Transport failures pass through untouched as
//! `Transport`. Non-2xx responses are mapped by `parse_response`; 401/403
//! and 404 get dedicated variants because callers routinely branch on them.

use thiserror::Error;

/// Errors returned by the request builder, the response parser, and
/// `DashboardClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed base URL, wrongly typed option value, or credentials that
    /// cannot be used with the resolved auth method.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A 2xx response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The server returned 404.
    #[error("resource not found: {message}")]
    NotFound { message: String },

    /// The server rejected the credentials (401 or 403).
    #[error("HTTP {status} unauthorized: {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-2xx response.
    #[error("HTTP {status} [{code}]: {message}")]
    Http {
        status: u16,
        code: String,
        message: String,
        body: String,
    },

    /// Surfaced unchanged from the transport collaborator.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        ApiError::Configuration(msg.into())
    }

    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Unauthorized { status, .. } | ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures raised by a `Transport` while executing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established or was dropped.
    #[error("connection failed: {0}")]
    Connection(String),

    /// TLS, protocol, or backend-specific failure.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
