//! Frame Projection
//!
//! Shape fetched records into [`TabularFrame`]s. Projectors are pure
//! functions of the fetched sequence.

use super::models::{BaseRun, PipelineStateInfo, UpdateInfo};
use crate::frame::{Field, TabularFrame};

pub const JOB_RUNS_FRAME: &str = "Databricks Job Runs";
pub const PIPELINES_FRAME: &str = "pipelines";
pub const PIPELINE_UPDATES_FRAME: &str = "pipeline updates";

/// Job runs, ascending by start time.
///
/// The sort is stable: runs starting at the same millisecond keep the
/// order in which they were fetched. IDs are rendered as decimal strings
/// since they do not fit a float64 column.
pub fn project_job_runs(mut runs: Vec<BaseRun>) -> TabularFrame {
    runs.sort_by_key(|run| run.start_time);

    TabularFrame::new(
        JOB_RUNS_FRAME,
        vec![
            Field::time_millis("Start Time", runs.iter().map(|r| r.start_time)),
            Field::time_millis("End Time", runs.iter().map(|r| r.end_time)),
            Field::string("Job ID", runs.iter().map(|r| r.job_id.to_string())),
            Field::string("Run ID", runs.iter().map(|r| r.run_id.to_string())),
            Field::string("Run Name", runs.iter().map(|r| r.run_name.as_str())),
            Field::string("Description", runs.iter().map(|r| r.description.as_str())),
            Field::int32("Attempt Number", runs.iter().map(|r| r.attempt_number)),
            Field::string("Status", runs.iter().map(BaseRun::status_state)),
            Field::int64(
                "Queue Duration (milliseconds)",
                runs.iter().map(|r| r.queue_duration),
            ),
            Field::int64(
                "Run Duration (milliseconds)",
                runs.iter().map(|r| r.run_duration),
            ),
            Field::string("Run URL", runs.iter().map(|r| r.run_page_url.as_str())),
        ],
    )
}

/// Pipelines, in fetch order
pub fn project_pipelines(pipelines: Vec<PipelineStateInfo>) -> TabularFrame {
    TabularFrame::new(
        PIPELINES_FRAME,
        vec![
            Field::string("Pipeline Id", pipelines.iter().map(|p| p.pipeline_id.as_str())),
            Field::string("Pipeline Name", pipelines.iter().map(|p| p.name.as_str())),
            Field::string("State", pipelines.iter().map(|p| p.state.as_str())),
        ],
    )
}

/// Pipeline updates, in fetch order
pub fn project_pipeline_updates(updates: Vec<UpdateInfo>) -> TabularFrame {
    TabularFrame::new(
        PIPELINE_UPDATES_FRAME,
        vec![
            Field::time_millis("Creation Time", updates.iter().map(|u| u.creation_time)),
            Field::string("Update Id", updates.iter().map(|u| u.update_id.as_str())),
            Field::string("Pipeline Id", updates.iter().map(|u| u.pipeline_id.as_str())),
            Field::string("Cause", updates.iter().map(|u| u.cause.as_str())),
            Field::string("State", updates.iter().map(|u| u.state.as_str())),
        ],
    )
}
