//! # REST API Errors
//!
//! Error types for the REST API module.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::observability::{Event, Logger};

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed filter structure in the query string
    #[error("Invalid query parameter '{key}={value}': {reason}")]
    QueryParse {
        key: String,
        value: String,
        reason: String,
    },

    /// No record with the given id
    #[error("Resource not found with id of {id}")]
    NotFound { resource: String, id: String },

    /// Unique field collision on insert or update
    #[error("Duplicate field value entered: {field} = {value}")]
    Duplicate { field: String, value: String },

    /// Invalid request body
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Underlying collection operation failed
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestError {
    /// Build a query parse error for the offending key/value pair
    pub fn query_parse(key: &str, value: &str, reason: impl Into<String>) -> Self {
        RestError::QueryParse {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Build a not-found error
    pub fn not_found(resource: &str, id: &str) -> Self {
        RestError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RestError::QueryParse { .. } => StatusCode::BAD_REQUEST,
            RestError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            RestError::InvalidBody(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            RestError::DataAccess(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl From<&RestError> for ErrorResponse {
    fn from(err: &RestError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            let code = status.as_u16().to_string();
            let message = self.to_string();
            Logger::error(
                Event::HttpError.as_str(),
                &[("status", code.as_str()), ("error", message.as_str())],
            );
        }
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
