//! Result Models
//!
//! Records returned by the Databricks listing endpoints. Every field
//! defaults when absent or `null` so that sparse API payloads still
//! deserialize.

use serde::{Deserialize, Deserializer};

/// Explicit `null` reads as the type's zero value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lifecycle status of a job run
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
}

/// Job run as returned by `jobs/runs/list`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaseRun {
    /// Epoch milliseconds
    #[serde(deserialize_with = "null_as_default")]
    pub start_time: i64,
    /// Epoch milliseconds, 0 while the run is still active
    #[serde(deserialize_with = "null_as_default")]
    pub end_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub job_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub run_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub run_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub attempt_number: i32,
    pub status: Option<RunStatus>,
    #[serde(deserialize_with = "null_as_default")]
    pub queue_duration: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub run_duration: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub run_page_url: String,
}

impl BaseRun {
    pub fn status_state(&self) -> &str {
        self.status.as_ref().map(|s| s.state.as_str()).unwrap_or("")
    }
}

/// Pipeline summary as returned by `pipelines` listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineStateInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub pipeline_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
}

/// Pipeline update as returned by `pipelines/{id}/updates`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpdateInfo {
    /// Epoch milliseconds
    #[serde(deserialize_with = "null_as_default")]
    pub creation_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub update_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pipeline_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cause: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_run_tolerates_missing_fields() {
        let run: BaseRun = serde_json::from_value(json!({
            "run_id": 42,
            "start_time": 1700000000000_i64
        }))
        .unwrap();

        assert_eq!(run.run_id, 42);
        assert_eq!(run.job_id, 0);
        assert_eq!(run.run_name, "");
        assert_eq!(run.status_state(), "");
    }

    #[test]
    fn test_base_run_reads_status_state() {
        let run: BaseRun = serde_json::from_value(json!({
            "job_id": 9007199254740993_i64,
            "status": { "state": "RUNNING", "termination_details": {} }
        }))
        .unwrap();

        assert_eq!(run.job_id, 9_007_199_254_740_993);
        assert_eq!(run.status_state(), "RUNNING");
    }

    #[test]
    fn test_null_fields_read_as_zero_values() {
        let run: BaseRun = serde_json::from_value(json!({
            "run_id": 7,
            "run_name": null,
            "end_time": null,
            "attempt_number": null,
            "status": null
        }))
        .unwrap();

        assert_eq!(run.run_id, 7);
        assert_eq!(run.run_name, "");
        assert_eq!(run.end_time, 0);
        assert_eq!(run.attempt_number, 0);
        assert_eq!(run.status_state(), "");

        let pipeline: PipelineStateInfo =
            serde_json::from_value(json!({"pipeline_id": "p-1", "name": null, "state": null}))
                .unwrap();
        assert_eq!(pipeline.name, "");

        let update: UpdateInfo =
            serde_json::from_value(json!({"update_id": "u-1", "creation_time": null, "cause": null}))
                .unwrap();
        assert_eq!(update.creation_time, 0);
        assert_eq!(update.cause, "");
    }

    #[test]
    fn test_update_info_ignores_unknown_fields() {
        let update: UpdateInfo = serde_json::from_value(json!({
            "update_id": "u-1",
            "pipeline_id": "p-1",
            "cause": "API_CALL",
            "state": "COMPLETED",
            "creation_time": 1700000000000_i64,
            "full_refresh": false
        }))
        .unwrap();

        assert_eq!(update.update_id, "u-1");
        assert_eq!(update.cause, "API_CALL");
    }
}
