//! In-memory workspace and provider for query tests

use super::ClientProvider;
use crate::databricks::listing::BoxedPager;
use crate::databricks::{PagedIterator, WorkspaceApi};
use crate::resource::models::{BaseRun, PipelineStateInfo, UpdateInfo};
use crate::resource::request::{ListPipelinesRequest, ListRunsRequest, ListUpdatesRequest};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub struct VecPager<T> {
    items: VecDeque<T>,
    served: usize,
    fail_at: Option<usize>,
}

#[async_trait]
impl<T: Send> PagedIterator<T> for VecPager<T> {
    async fn has_next(&mut self, _cancel: &CancellationToken) -> bool {
        !self.items.is_empty()
    }

    async fn next(&mut self, cancel: &CancellationToken) -> Result<T> {
        if cancel.is_cancelled() {
            return Err(anyhow!("request cancelled"));
        }
        if self.fail_at == Some(self.served) {
            return Err(anyhow!("API request failed: 500 Internal Server Error"));
        }
        self.served += 1;
        self.items.pop_front().ok_or_else(|| anyhow!("listing exhausted"))
    }
}

#[derive(Default)]
pub struct FakeWorkspace {
    pub runs: Vec<BaseRun>,
    pub pipelines: Vec<PipelineStateInfo>,
    pub updates: Vec<UpdateInfo>,
    /// Fail the n-th `next` call of every listing
    pub fail_at: Option<usize>,
    pub run_requests: Mutex<Vec<ListRunsRequest>>,
    pub update_requests: Mutex<Vec<ListUpdatesRequest>>,
}

impl FakeWorkspace {
    fn pager<T: Clone + Send + 'static>(&self, items: &[T]) -> BoxedPager<T> {
        Box::new(VecPager {
            items: items.iter().cloned().collect(),
            served: 0,
            fail_at: self.fail_at,
        })
    }
}

impl WorkspaceApi for FakeWorkspace {
    fn list_runs(&self, request: ListRunsRequest) -> BoxedPager<BaseRun> {
        if let Ok(mut requests) = self.run_requests.lock() {
            requests.push(request);
        }
        self.pager(&self.runs)
    }

    fn list_pipelines(&self, _request: ListPipelinesRequest) -> BoxedPager<PipelineStateInfo> {
        self.pager(&self.pipelines)
    }

    fn list_updates(&self, request: ListUpdatesRequest) -> BoxedPager<UpdateInfo> {
        if let Ok(mut requests) = self.update_requests.lock() {
            requests.push(request);
        }
        self.pager(&self.updates)
    }
}

/// Provider handing out one shared fake workspace, or failing when it has none
pub struct FakeProvider {
    pub workspace: Option<Arc<FakeWorkspace>>,
    pub calls: AtomicUsize,
}

impl FakeProvider {
    pub fn with(workspace: FakeWorkspace) -> Self {
        Self {
            workspace: Some(Arc::new(workspace)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            workspace: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientProvider for FakeProvider {
    async fn workspace(&self, _cancel: &CancellationToken) -> Result<Arc<dyn WorkspaceApi>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.workspace {
            Some(workspace) => {
                let api: Arc<dyn WorkspaceApi> = workspace.clone();
                Ok(api)
            }
            None => Err(anyhow!("Authentication is missing")),
        }
    }
}

pub fn runs(start_times: &[i64]) -> Vec<BaseRun> {
    start_times
        .iter()
        .enumerate()
        .map(|(i, &start_time)| BaseRun {
            start_time,
            run_id: i as i64 + 1,
            job_id: 42,
            run_name: format!("run-{}", i + 1),
            ..Default::default()
        })
        .collect()
}
