//! Query Router
//!
//! Drives one sub-query from its raw JSON body to an outcome. Validation
//! is pure and runs first, so a bad request never reaches the workspace.

use super::{ClientProvider, QueryOutcome};
use crate::error::{ErrorClass, QueryError};
use crate::frame::TabularFrame;
use crate::resource::{get_handler, ResourceKind, TimeRange};
use serde::Deserialize;
use serde_json::Value;
use std::num::NonZeroUsize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryModel {
    #[serde(default)]
    resource_type: String,
    #[serde(default)]
    resource_params: Option<Value>,
    #[serde(default)]
    time_range: Option<TimeRange>,
    #[serde(default)]
    limit: Option<i64>,
}

/// Parsed sub-query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub kind: ResourceKind,
    pub params: Option<Value>,
    pub time_range: Option<TimeRange>,
    pub cap: NonZeroUsize,
}

impl QueryDescriptor {
    pub fn parse(body: Value, default_limit: NonZeroUsize) -> Result<Self, QueryError> {
        let model: QueryModel = serde_path_to_error::deserialize(body)
            .map_err(|e| QueryError::MalformedQuery(e.to_string()))?;

        let kind = ResourceKind::parse(&model.resource_type)?;
        let cap = match model.limit {
            None => default_limit,
            Some(limit) => usize::try_from(limit)
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or(QueryError::InvalidLimit(limit))?,
        };

        Ok(Self {
            kind,
            params: model.resource_params,
            time_range: model.time_range,
            cap,
        })
    }
}

/// Run one sub-query. Always yields exactly one outcome.
pub async fn run_query(
    body: Value,
    default_limit: NonZeroUsize,
    provider: &dyn ClientProvider,
    cancel: &CancellationToken,
) -> QueryOutcome {
    match execute(body, default_limit, provider, cancel).await {
        Ok(frame) => {
            tracing::debug!("Frame '{}' with {} rows", frame.name, frame.row_count());
            frame.into()
        }
        Err(err) => {
            match err.class() {
                ErrorClass::BadRequest => tracing::warn!("Rejected query: {}", err),
                ErrorClass::Internal => tracing::error!("Query failed: {}", err),
            }
            err.into()
        }
    }
}

async fn execute(
    body: Value,
    default_limit: NonZeroUsize,
    provider: &dyn ClientProvider,
    cancel: &CancellationToken,
) -> Result<TabularFrame, QueryError> {
    let descriptor = QueryDescriptor::parse(body, default_limit)?;
    let handler = get_handler(descriptor.kind)
        .ok_or_else(|| QueryError::UnknownResourceKind(descriptor.kind.tag().to_string()))?;
    let prepared = handler.prepare(descriptor.params.as_ref(), descriptor.time_range.as_ref())?;

    let api = provider
        .workspace(cancel)
        .await
        .map_err(QueryError::ClientUnavailable)?;

    prepared.execute(api.as_ref(), descriptor.cap, cancel).await
}
