//! # API Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Allot                                  │
//! │                                                                         │
//! │  allot edit --sub-order S-1 --set 0=5 --commit                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Scenario unreadable? ── io::Error / serde_json::Error ──┐      │  │
//! │  │         │                                                │      │  │
//! │  │         ▼                                                ▼      │  │
//! │  │  Unknown sub-order? ─── CoreError::SubOrderNotFound ── ApiError ►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Edit refused? ──────── EditViolation list ────────── ApiError ─►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  main() prints the error (text or JSON) and exits with its code.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Errors serialize with a machine-readable `code` and a human-readable
//! `message`, so `--json` callers can branch on the code.

use serde::Serialize;
use thiserror::Error;

use allot_core::{CoreError, EditViolation, ValidationError};

/// API error returned from console commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "SubOrder not found: S-404"
/// }
/// ```
#[derive(Debug, Clone, Error, Serialize)]
#[error("[{code:?}] {message}")]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced order, draft line or price rule does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Configuration file or environment is invalid
    ConfigError,

    /// File could not be read or written
    IoError,

    /// Scenario file is not valid JSON for the expected shape
    ParseError,

    /// Manual edit failed validation and was not committed
    EditRejected,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::NotFound => 3,
            ErrorCode::ValidationError | ErrorCode::ParseError => 4,
            ErrorCode::ConfigError => 5,
            ErrorCode::IoError => 6,
            ErrorCode::EditRejected => 7,
            ErrorCode::Internal => 1,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ConfigError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates an error for a response that could not be written as JSON.
    ///
    /// Parse failures of scenario files go through `From<serde_json::Error>`
    /// instead.
    pub fn serialization(err: serde_json::Error) -> Self {
        ApiError::internal(format!("Failed to serialize output: {}", err))
    }

    /// Creates an error listing every reason an edit was refused.
    pub fn edit_rejected(sub_order_id: &str, violations: &[EditViolation]) -> Self {
        let reasons: Vec<String> = violations.iter().map(ToString::to_string).collect();
        ApiError::new(
            ErrorCode::EditRejected,
            format!(
                "Edit for subOrder {} rejected: {}",
                sub_order_id,
                reasons.join(" ")
            ),
        )
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SubOrderNotFound(id) => ApiError::not_found("SubOrder", &id),
            CoreError::NoOpenDraft(id) => {
                ApiError::validation(format!("No open edit for subOrder {}", id))
            }
            CoreError::LineIndexOutOfRange {
                sub_order_id,
                index,
                len,
            } => ApiError::new(
                ErrorCode::NotFound,
                format!(
                    "Line {} not found for subOrder {} ({} lines)",
                    index, sub_order_id, len
                ),
            ),
            CoreError::PriceRuleNotFound {
                item_id,
                supplier_id,
            } => ApiError::not_found("Price rule", &format!("{}/{}", item_id, supplier_id)),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::new(ErrorCode::IoError, err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::new(ErrorCode::ParseError, format!("Invalid scenario: {}", err))
    }
}

impl From<toml::de::Error> for ApiError {
    fn from(err: toml::de::Error) -> Self {
        ApiError::config(format!("Invalid config file: {}", err))
    }
}
