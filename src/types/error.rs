//! Error types for the workshop API
//!
//! Engine operations keep distinct error kinds so callers can branch on them;
//! the HTTP layer collapses store and internal failures to an opaque message.

use hyper::StatusCode;

use crate::db::schemas::Status;

/// Main error type for workshop operations
#[derive(Debug, thiserror::Error)]
pub enum WorkshopError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: workshop is {actual}, expected {expected}")]
    InvalidState { expected: Status, actual: Status },

    #[error("Invalid chain: {0}")]
    InvalidChain(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WorkshopError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState { .. } => StatusCode::CONFLICT,
            Self::InvalidChain(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::InvalidChain(_) => "INVALID_CHAIN",
            Self::Store(_) => "STORE_FAILURE",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Internal(_) | Self::Config(_) => "INTERNAL",
        }
    }

    /// Message safe to hand to a remote caller.
    ///
    /// Driver and internal detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) => "Storage unavailable".to_string(),
            Self::Internal(_) | Self::Config(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for WorkshopError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for WorkshopError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<hyper::Error> for WorkshopError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<mongodb::error::Error> for WorkshopError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<bson::ser::Error> for WorkshopError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Internal(format!("BSON encode error: {}", err))
    }
}

impl From<bson::de::Error> for WorkshopError {
    fn from(err: bson::de::Error) -> Self {
        Self::Internal(format!("BSON decode error: {}", err))
    }
}

impl From<bson::oid::Error> for WorkshopError {
    fn from(err: bson::oid::Error) -> Self {
        Self::BadRequest(format!("Invalid id: {}", err))
    }
}

/// Result type alias for workshop operations
pub type Result<T> = std::result::Result<T, WorkshopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_names_actual_status() {
        let err = WorkshopError::InvalidState {
            expected: Status::Active,
            actual: Status::Completed,
        };
        assert!(err.to_string().contains("completed"));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "INVALID_STATE");
    }

    #[test]
    fn test_store_failure_is_opaque_to_callers() {
        let err = WorkshopError::Store("connection reset by 10.0.0.3:27017".into());
        assert_eq!(err.public_message(), "Storage unavailable");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_not_found_keeps_message() {
        let err = WorkshopError::NotFound("workshop 65f0".into());
        assert_eq!(err.public_message(), "Not found: workshop 65f0");
    }
}
