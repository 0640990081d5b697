//! # Response Formatting
//!
//! Standard response types for the REST API. Paginated lists use
//! [`ResultEnvelope`](super::advanced::ResultEnvelope).

use serde::Serialize;
use serde_json::{json, Value};

/// Unpaginated list response
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            success: true,
            count,
            data,
        }
    }
}

/// Single record response
#[derive(Debug, Clone, Serialize)]
pub struct SingleResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> SingleResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl SingleResponse<Value> {
    /// Response for a deleted record: `data` is an empty object
    pub fn deleted() -> Self {
        Self::new(json!({}))
    }
}
