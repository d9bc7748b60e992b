//! Query Errors
//!
//! Classified errors for a single sub-query. Every variant maps to an
//! [`ErrorClass`], which is what ends up in the outbound outcome.

use serde::Serialize;
use thiserror::Error;

/// Outcome error class reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorClass {
    BadRequest,
    Internal,
}

/// Errors raised while validating or executing one sub-query
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("json unmarshal: {0}")]
    MalformedQuery(String),

    #[error("unknown resource kind: {0}")]
    UnknownResourceKind(String),

    #[error("failed to parse {kind} params: {reason}")]
    MalformedParams { kind: &'static str, reason: String },

    #[error("invalid {field}: {reason}")]
    InvalidParam { field: &'static str, reason: String },

    #[error("invalid limit: {0} (must be a positive integer)")]
    InvalidLimit(i64),

    #[error("failed to get databricks client: {0:#}")]
    ClientUnavailable(anyhow::Error),

    #[error("failed to fetch {kind}: {cause:#}")]
    Fetch {
        kind: &'static str,
        cause: anyhow::Error,
    },
}

impl QueryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            QueryError::MalformedQuery(_)
            | QueryError::UnknownResourceKind(_)
            | QueryError::MalformedParams { .. }
            | QueryError::InvalidParam { .. }
            | QueryError::InvalidLimit(_) => ErrorClass::BadRequest,
            QueryError::ClientUnavailable(_) | QueryError::Fetch { .. } => ErrorClass::Internal,
        }
    }
}
