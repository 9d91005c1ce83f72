//! API request/response types

use serde::{Deserialize, Serialize};

/// Standard API response envelope
///
/// Every successful JSON response carries the HTTP status, a human-readable
/// message and an optional payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status code, mirrored in the body
    pub status: u16,
    /// Human-readable outcome
    pub message: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a response carrying data
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Create a response without a payload
    pub fn message(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
        }
    }
}

/// API error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// HTTP status code, mirrored in the body
    pub status: u16,
    /// Human-readable error message
    pub message: String,
    pub error: ApiErrorCode,
}

/// Machine-readable error code (e.g., `INVALID_CREDENTIALS`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorCode {
    pub code: String,
}

impl ApiErrorBody {
    /// Create a new API error body
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: ApiErrorCode { code: code.into() },
        }
    }
}
