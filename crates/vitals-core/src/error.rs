//! Shared error type across vitals crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// No route matched.
    NotFound,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, VitalsError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum VitalsError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("metric already registered: {0}")]
    AlreadyRegistered(String),
    #[error("label mismatch for {name}: expected {expected} values, got {got}")]
    LabelMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("internal: {0}")]
    Internal(String),
}

impl VitalsError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            VitalsError::BadRequest(_) => ClientCode::BadRequest,
            VitalsError::NotFound(_) => ClientCode::NotFound,
            VitalsError::AlreadyRegistered(_)
            | VitalsError::LabelMismatch { .. }
            | VitalsError::Internal(_) => ClientCode::Internal,
        }
    }
}

impl From<std::fmt::Error> for VitalsError {
    fn from(e: std::fmt::Error) -> Self {
        VitalsError::Internal(format!("render failed: {e}"))
    }
}
