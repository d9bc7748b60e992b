//! Property-based tests using proptest
//!
//! These tests check the bounded fetcher and the frame projectors against
//! randomized listings, caps and failure points.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dbxq::databricks::PagedIterator;
use dbxq::frame::FieldValues;
use dbxq::resource::fetch_with_limit;
use dbxq::resource::models::{BaseRun, PipelineStateInfo, RunStatus};
use dbxq::resource::projection::{project_job_runs, project_pipelines};
use proptest::prelude::*;
use std::num::NonZeroUsize;
use tokio_util::sync::CancellationToken;

/// Listing of `len` items split in pages, optionally failing on one `next` call
struct PagedSource {
    len: usize,
    page_size: usize,
    pos: usize,
    pages_fetched: usize,
    fail_at: Option<usize>,
}

#[async_trait]
impl PagedIterator<usize> for PagedSource {
    async fn has_next(&mut self, _cancel: &CancellationToken) -> bool {
        if self.pos >= self.len {
            return false;
        }
        if self.pos % self.page_size == 0 && self.pos / self.page_size == self.pages_fetched {
            self.pages_fetched += 1;
        }
        true
    }

    async fn next(&mut self, _cancel: &CancellationToken) -> Result<usize> {
        if self.fail_at == Some(self.pos) {
            return Err(anyhow!("page request failed"));
        }
        let item = self.pos;
        self.pos += 1;
        Ok(item)
    }
}

fn fetch(source: &mut PagedSource, cap: usize) -> Result<Vec<usize>> {
    let cap = NonZeroUsize::new(cap).unwrap();
    tokio_test::block_on(fetch_with_limit(source, cap, &CancellationToken::new()))
}

fn arb_run() -> impl Strategy<Value = BaseRun> {
    (
        0i64..5_000,
        any::<i64>(),
        prop_oneof!["PENDING", "RUNNING", "TERMINATED", "SKIPPED", ""],
        "[a-z][a-z0-9_-]{0,20}",
    )
        .prop_map(|(start_time, run_id, state, run_name)| BaseRun {
            start_time,
            run_id,
            run_name,
            status: Some(RunStatus {
                state: state.to_string(),
            }),
            ..Default::default()
        })
}

fn column(values: &FieldValues) -> Vec<String> {
    match values {
        FieldValues::String(v) => v.clone(),
        FieldValues::Time(v) => v.iter().map(|t| t.to_rfc3339()).collect(),
        FieldValues::Int32(v) => v.iter().map(|n| n.to_string()).collect(),
        FieldValues::Int64(v) => v.iter().map(|n| n.to_string()).collect(),
    }
}

proptest! {
    /// Fetched count is min(available, cap) and keeps listing order
    #[test]
    fn fetch_returns_min_of_available_and_cap(
        len in 0usize..200,
        page_size in 1usize..50,
        cap in 1usize..250,
    ) {
        let mut source = PagedSource { len, page_size, pos: 0, pages_fetched: 0, fail_at: None };
        let items = fetch(&mut source, cap).unwrap();

        prop_assert_eq!(items.len(), len.min(cap));
        prop_assert_eq!(items, (0..len.min(cap)).collect::<Vec<_>>());
    }

    /// No page beyond the one holding the last wanted item is requested
    #[test]
    fn fetch_never_reads_past_cap(
        len in 1usize..200,
        page_size in 1usize..50,
        cap in 1usize..250,
    ) {
        let mut source = PagedSource { len, page_size, pos: 0, pages_fetched: 0, fail_at: None };
        fetch(&mut source, cap).unwrap();

        let wanted = len.min(cap);
        prop_assert_eq!(source.pos, wanted);
        prop_assert_eq!(source.pages_fetched, wanted.div_ceil(page_size));
    }

    /// A failure before the cap is reached discards the whole result
    #[test]
    fn fetch_failure_before_cap_is_an_error(
        len in 1usize..200,
        cap in 1usize..250,
        fail_seed in any::<usize>(),
    ) {
        let wanted = len.min(cap);
        let fail_at = fail_seed % wanted;
        let mut source = PagedSource { len, page_size: 25, pos: 0, pages_fetched: 0, fail_at: Some(fail_at) };

        prop_assert!(fetch(&mut source, cap).is_err());
    }

    /// A failure past the cap is never reached
    #[test]
    fn fetch_failure_past_cap_is_never_seen(
        len in 2usize..200,
        cap_seed in any::<usize>(),
    ) {
        let cap = 1 + cap_seed % (len - 1);
        let mut source = PagedSource { len, page_size: 25, pos: 0, pages_fetched: 0, fail_at: Some(cap) };

        prop_assert_eq!(fetch(&mut source, cap).unwrap().len(), cap);
    }

    /// Job run rows are ascending by start time, ties keep fetch order
    #[test]
    fn job_runs_sorted_and_stable(runs in prop::collection::vec(arb_run(), 0..60)) {
        let frame = project_job_runs(runs.clone());
        prop_assert_eq!(frame.row_count(), runs.len());

        let mut expected = runs;
        expected.sort_by_key(|r| r.start_time);
        let expected_ids: Vec<String> = expected.iter().map(|r| r.run_id.to_string()).collect();

        let run_ids = column(&frame.field("Run ID").unwrap().values);
        prop_assert_eq!(run_ids, expected_ids);
    }

    /// Every column of a frame has the same length
    #[test]
    fn job_run_columns_share_row_count(runs in prop::collection::vec(arb_run(), 0..60)) {
        let frame = project_job_runs(runs);
        let rows = frame.row_count();
        for field in &frame.fields {
            prop_assert_eq!(field.values.len(), rows, "column {}", field.name);
        }
    }

    /// Projection is deterministic down to the serialized bytes
    #[test]
    fn projection_is_deterministic(runs in prop::collection::vec(arb_run(), 0..30)) {
        let a = serde_json::to_string(&project_job_runs(runs.clone())).unwrap();
        let b = serde_json::to_string(&project_job_runs(runs)).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Pipelines keep fetch order
    #[test]
    fn pipelines_keep_fetch_order(ids in prop::collection::vec("[a-f0-9]{8}", 0..40)) {
        let pipelines = ids
            .iter()
            .map(|id| PipelineStateInfo { pipeline_id: id.clone(), ..Default::default() })
            .collect();
        let frame = project_pipelines(pipelines);

        prop_assert_eq!(column(&frame.field("Pipeline Id").unwrap().values), ids);
    }
}
