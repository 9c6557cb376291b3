use std::fmt;
use thiserror::Error;

/// The base error type shared by all Slotwise crates.
///
/// Each crate keeps its own precise error enum and converts into this one at
/// the boundary where a caller (e.g. an HTTP layer) needs a status code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotwiseError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// The caller abandoned the request
    #[error("Cancelled: {0}")]
    CancelledError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for SlotwiseError {
    fn status_code(&self) -> u16 {
        match self {
            SlotwiseError::HttpError(_) => 500,
            SlotwiseError::ParseError(_) => 400,
            SlotwiseError::ConfigError(_) => 500,
            SlotwiseError::ValidationError(_) => 400,
            SlotwiseError::ExternalServiceError { .. } => 502,
            SlotwiseError::TimeoutError(_) => 504,
            SlotwiseError::CancelledError(_) => 408,
            SlotwiseError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for SlotwiseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SlotwiseError::TimeoutError(err.to_string())
        } else {
            SlotwiseError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SlotwiseError {
    fn from(err: serde_json::Error) -> Self {
        SlotwiseError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> SlotwiseError {
    SlotwiseError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> SlotwiseError {
    SlotwiseError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> SlotwiseError {
    SlotwiseError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn timeout_error<T: fmt::Display>(message: T) -> SlotwiseError {
    SlotwiseError::TimeoutError(message.to_string())
}
