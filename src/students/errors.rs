//! # Student Errors
//!
//! Error types for the service and interface layers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Result type for student operations
pub type StudentResult<T> = Result<T, StudentError>;

/// Student service errors
#[derive(Debug, Error)]
pub enum StudentError {
    // ==================
    // Expected Outcomes
    // ==================
    /// Record absent
    #[error("Student not found")]
    NotFound,

    /// Email already owned by another student
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    // ==================
    // Client Errors
    // ==================
    /// Malformed or missing input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================
    // Server Errors
    // ==================
    /// Record store failure
    #[error("Store failure: {0}")]
    Store(StoreError),
}

impl StudentError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StudentError::NotFound => StatusCode::NOT_FOUND,
            StudentError::DuplicateEmail(_) => StatusCode::CONFLICT,
            StudentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StudentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Expected outcomes are reported to the caller, never logged as failures
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            StudentError::NotFound | StudentError::DuplicateEmail(_)
        )
    }
}

impl From<StoreError> for StudentError {
    fn from(err: StoreError) -> Self {
        // email is the only unique column
        if err.is_unique_violation() {
            let email = err
                .details()
                .and_then(|d| d.strip_prefix("email: "))
                .unwrap_or_default()
                .to_string();
            StudentError::DuplicateEmail(email)
        } else {
            StudentError::Store(err)
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&StudentError> for ErrorResponse {
    fn from(err: &StudentError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for StudentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
