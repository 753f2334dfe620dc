//! Error types for SoilSync
//!
//! Validation failures are user-facing; every other variant is either
//! recovered by the fallback engine or swallowed by the audit dispatcher.

use thiserror::Error;

/// Rejection of a soil request before any prediction is attempted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Request body is not a JSON object
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// Required field absent
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Field present but not a number (or numeric string)
    #[error("Field '{field}' must be numeric, got {value}")]
    NonNumeric { field: String, value: String },

    /// NaN or infinite value
    #[error("Field '{0}' must be a finite number")]
    NonFinite(String),

    /// Value outside its documented range
    #[error("Field '{field}' = {value} is outside the accepted range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Sand + clay + silt does not add up to roughly 100%
    #[error("Soil texture must sum to 95-105%, got {sum:.1}%")]
    TextureSum { sum: f64 },

    /// crop_type empty or not a string
    #[error("crop_type must be a non-empty string")]
    InvalidCropType,
}

/// Main error type for the SoilSync prediction pipeline
#[derive(Error, Debug)]
pub enum SoilSyncError {
    /// Input validation errors
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Remote predictor unreachable, disabled or returned a non-success status
    #[error("Remote predictor unavailable: {0}")]
    RemoteUnavailable(String),

    /// Remote predictor answered with a body we cannot use
    #[error("Malformed remote response: {0}")]
    MalformedResponse(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Persistence collaborator errors
    #[error("Audit logging failed: {0}")]
    Audit(String),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Invalid prediction phase transition
    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// Result type alias for SoilSync operations
pub type Result<T> = std::result::Result<T, SoilSyncError>;

impl SoilSyncError {
    /// Whether the error belongs to the remote-unavailable family that the
    /// predictor client recovers from by falling back
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            SoilSyncError::RemoteUnavailable(_)
                | SoilSyncError::MalformedResponse(_)
                | SoilSyncError::HttpError(_)
                | SoilSyncError::SerializationError(_)
                | SoilSyncError::Timeout { .. }
        )
    }
}
