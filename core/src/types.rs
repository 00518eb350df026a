//! Response DTOs for the dashboard API.
//!
//! # Design
//! The client does not model individual dashboard resources. Every
//! successful response is normalized into `ApiResponse` with a JSON body;
//! callers that want typed data deserialize it with `ApiResponse::json`.
//! `WpErrorBody` mirrors the envelope WordPress uses for REST errors.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::find_header;

/// WordPress pagination headers on collection responses.
pub const HEADER_WP_TOTAL: &str = "X-WP-Total";
pub const HEADER_WP_TOTAL_PAGES: &str = "X-WP-TotalPages";

/// Normalized result of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Decoded JSON body; `Null` when the server sent no content.
    pub body: Value,
}

impl ApiResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Deserialize the body into a caller-defined type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        T::deserialize(&self.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Total item count advertised by a collection endpoint.
    pub fn total(&self) -> Option<u64> {
        self.header(HEADER_WP_TOTAL)?.trim().parse().ok()
    }

    pub fn total_pages(&self) -> Option<u64> {
        self.header(HEADER_WP_TOTAL_PAGES)?.trim().parse().ok()
    }
}

/// Error envelope returned by the WordPress REST API, e.g.
/// `{"code":"rest_forbidden","message":"…","data":{"status":401}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WpErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
