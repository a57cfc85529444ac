// errors.rs
use thiserror::Error;

use crate::pipeline::FacetError;
use crate::source::SourceError;

/// Errors originating from either the server logic
/// (routing, auth, missing resources) or downstream layers (DB, sheet source).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Database Error: {0}")]
    DbError(String),
    /// No dataset to serve yet, or the last load failed.
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error("Internal Server Error")]
    InternalError,
}

impl From<FacetError> for ServerError {
    fn from(e: FacetError) -> Self {
        ServerError::BadRequest(e.to_string())
    }
}

impl From<SourceError> for ServerError {
    fn from(e: SourceError) -> Self {
        ServerError::Unavailable(e.to_string())
    }
}
