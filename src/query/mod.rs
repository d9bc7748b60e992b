//! Query handling
//!
//! Turns inbound query descriptors into frames. [`router`] drives a single
//! sub-query through validation and execution; [`batch`] runs a whole
//! request and keys each outcome by its `refId`.

pub mod batch;
pub mod router;

#[cfg(test)]
mod testing;

use crate::databricks::WorkspaceApi;
use crate::error::{ErrorClass, QueryError};
use crate::frame::TabularFrame;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub use batch::{query_data, DataQuery, QueryDataRequest, QueryDataResponse};
pub use router::{run_query, QueryDescriptor};

/// Source of an authenticated workspace, asked only once a sub-query has
/// passed validation
#[async_trait]
pub trait ClientProvider: Send + Sync {
    async fn workspace(&self, cancel: &CancellationToken) -> Result<Arc<dyn WorkspaceApi>>;
}

/// Result of one sub-query: a frame or a classified error, never both
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Frame {
        frame: TabularFrame,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        error_class: ErrorClass,
        message: String,
    },
}

impl QueryOutcome {
    pub fn frame(&self) -> Option<&TabularFrame> {
        match self {
            QueryOutcome::Frame { frame } => Some(frame),
            QueryOutcome::Error { .. } => None,
        }
    }

    pub fn error_class(&self) -> Option<ErrorClass> {
        match self {
            QueryOutcome::Frame { .. } => None,
            QueryOutcome::Error { error_class, .. } => Some(*error_class),
        }
    }
}

impl From<TabularFrame> for QueryOutcome {
    fn from(frame: TabularFrame) -> Self {
        QueryOutcome::Frame { frame }
    }
}

impl From<QueryError> for QueryOutcome {
    fn from(err: QueryError) -> Self {
        QueryOutcome::Error {
            error_class: err.class(),
            message: err.to_string(),
        }
    }
}
