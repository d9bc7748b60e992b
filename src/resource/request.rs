//! Request Builders
//!
//! Translate the loosely typed `resourceParams` blob plus the ambient time
//! range into typed listing requests. Builders are pure: they never touch
//! the network, and every failure is a bad-request [`QueryError`].

use crate::error::QueryError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Max page size accepted by `jobs/runs/list`
pub const JOB_RUNS_PAGE_LIMIT: u32 = 25;

/// Max page size accepted by `pipelines/{id}/updates`
pub const PIPELINE_UPDATES_PAGE_LIMIT: u32 = 100;

/// Ambient time range of a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct TimeRange {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Both bounds as epoch millis, or `None` unless both are set and non-zero
    pub fn bounds_millis(&self) -> Option<(i64, i64)> {
        let from = self.from?.timestamp_millis();
        let to = self.to?.timestamp_millis();
        if from == 0 || to == 0 {
            return None;
        }
        Some((from, to))
    }
}

// =============================================================================
// Params (as sent by the caller)
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobRunParams {
    pub job_id: String,
    pub active_only: bool,
    pub completed_only: bool,
    pub run_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineUpdatesParams {
    pub pipeline_id: String,
}

/// Decode a params blob; a missing or null blob is an empty object
pub fn parse_params<P: DeserializeOwned>(
    kind: &'static str,
    raw: Option<&Value>,
) -> Result<P, QueryError> {
    let value = match raw {
        None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
        Some(v) => v.clone(),
    };

    // The path names the offending field, e.g. `activeOnly: invalid type ...`
    serde_path_to_error::deserialize(value).map_err(|e| QueryError::MalformedParams {
        kind,
        reason: e.to_string(),
    })
}

// =============================================================================
// Typed requests
// =============================================================================

/// Query for `GET /api/2.1/jobs/runs/list`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListRunsRequest {
    pub limit: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub active_only: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub completed_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_to: Option<i64>,
}

/// Query for `GET /api/2.0/pipelines`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListPipelinesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Query for `GET /api/2.0/pipelines/{pipeline_id}/updates`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListUpdatesRequest {
    #[serde(skip)]
    pub pipeline_id: String,
    pub max_results: u32,
}

pub fn build_list_runs_request(
    params: &JobRunParams,
    time_range: Option<&TimeRange>,
) -> Result<ListRunsRequest, QueryError> {
    let mut req = ListRunsRequest {
        limit: JOB_RUNS_PAGE_LIMIT,
        active_only: params.active_only,
        completed_only: params.completed_only,
        ..Default::default()
    };

    if !params.job_id.is_empty() {
        let job_id = params
            .job_id
            .parse::<i64>()
            .map_err(|e| QueryError::InvalidParam {
                field: "jobId",
                reason: format!("{:?}: {}", params.job_id, e),
            })?;
        req.job_id = Some(job_id);
    }

    // Partial ranges are dropped, never applied one-sided
    if let Some((from, to)) = time_range.and_then(TimeRange::bounds_millis) {
        req.start_time_from = Some(from);
        req.start_time_to = Some(to);
    }

    // Not checked locally; the API rejects unknown run types
    if !params.run_type.is_empty() {
        req.run_type = Some(params.run_type.clone());
    }

    Ok(req)
}

pub fn build_list_pipelines_request(
    params: &PipelineParams,
    _time_range: Option<&TimeRange>,
) -> Result<ListPipelinesRequest, QueryError> {
    let filter = (!params.filter.is_empty()).then(|| params.filter.clone());
    Ok(ListPipelinesRequest { filter })
}

pub fn build_list_updates_request(
    params: &PipelineUpdatesParams,
    _time_range: Option<&TimeRange>,
) -> Result<ListUpdatesRequest, QueryError> {
    Ok(ListUpdatesRequest {
        pipeline_id: params.pipeline_id.clone(),
        max_results: PIPELINE_UPDATES_PAGE_LIMIT,
    })
}
