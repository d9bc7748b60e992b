//! Batch Orchestrator
//!
//! Runs every sub-query of a request, one at a time and in caller order,
//! and keys each outcome by its `refId`.

use super::router::run_query;
use super::{ClientProvider, QueryOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Inbound batch. Elements stay raw so one malformed sub-query cannot
/// sink the others.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryDataRequest {
    #[serde(default)]
    pub queries: Vec<Value>,
}

/// One sub-query: its `refId` plus the raw body the router parses
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuery {
    pub ref_id: String,
    pub body: Value,
}

impl DataQuery {
    /// Split `refId` off a raw element. Numbers and booleans are rendered
    /// as strings; a missing or unusable `refId` falls back to `#<index>`.
    pub fn from_raw(index: usize, raw: Value) -> Self {
        let positional = || format!("#{}", index);

        match raw {
            Value::Object(mut body) => {
                let ref_id = match body.remove("refId") {
                    Some(Value::String(id)) if !id.is_empty() => id,
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    _ => positional(),
                };
                Self {
                    ref_id,
                    body: Value::Object(body),
                }
            }
            other => Self {
                ref_id: positional(),
                body: other,
            },
        }
    }
}

/// Outbound batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryDataResponse {
    pub responses: BTreeMap<String, QueryOutcome>,
}

/// Run a whole batch. A failing sub-query never affects the others.
pub async fn query_data(
    request: QueryDataRequest,
    default_limit: NonZeroUsize,
    provider: &dyn ClientProvider,
    cancel: &CancellationToken,
) -> QueryDataResponse {
    let batch_id = Uuid::new_v4();
    let span = tracing::info_span!("batch", id = %batch_id);

    async move {
        tracing::info!("Running {} queries", request.queries.len());

        let mut responses = BTreeMap::new();
        for (index, raw) in request.queries.into_iter().enumerate() {
            let query = DataQuery::from_raw(index, raw);
            let outcome = run_query(query.body, default_limit, provider, cancel)
                .instrument(tracing::debug_span!("query", ref_id = %query.ref_id))
                .await;

            if responses.insert(query.ref_id.clone(), outcome).is_some() {
                tracing::warn!("Duplicate refId '{}', keeping the later outcome", query.ref_id);
            }
        }

        QueryDataResponse { responses }
    }
    .instrument(span)
    .await
}
