//! Resource Registry
//!
//! Maps each [`ResourceKind`] to the handler that knows how to build its
//! request, open its listing and project its frame. Adding a resource kind
//! means adding one registry entry; the router never branches on kinds.

use super::fetcher::fetch_with_limit;
use super::models::{BaseRun, PipelineStateInfo, UpdateInfo};
use super::projection::{project_job_runs, project_pipeline_updates, project_pipelines};
use super::request::{
    build_list_pipelines_request, build_list_runs_request, build_list_updates_request,
    parse_params, JobRunParams, ListPipelinesRequest, ListRunsRequest, ListUpdatesRequest,
    PipelineParams, PipelineUpdatesParams, TimeRange,
};
use crate::databricks::listing::BoxedPager;
use crate::databricks::WorkspaceApi;
use crate::error::QueryError;
use crate::frame::TabularFrame;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::num::NonZeroUsize;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

/// Closed set of queryable resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    JobRuns,
    PipelineList,
    PipelineUpdates,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::JobRuns,
        ResourceKind::PipelineList,
        ResourceKind::PipelineUpdates,
    ];

    /// Wire tag used in `resourceType`
    pub fn tag(self) -> &'static str {
        match self {
            ResourceKind::JobRuns => "job_runs",
            ResourceKind::PipelineList => "pipelines",
            ResourceKind::PipelineUpdates => "pipeline_updates",
        }
    }

    pub fn parse(tag: &str) -> Result<Self, QueryError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| QueryError::UnknownResourceKind(tag.to_string()))
    }
}

/// A validated request, ready to run against a workspace
#[async_trait]
pub trait PreparedQuery: Send + Debug {
    async fn execute(
        self: Box<Self>,
        api: &dyn WorkspaceApi,
        max_items: NonZeroUsize,
        cancel: &CancellationToken,
    ) -> Result<TabularFrame, QueryError>;
}

/// Per-kind request building, independent of any workspace
pub trait ResourceHandler: Send + Sync {
    /// Human readable name, used in messages
    fn display_name(&self) -> &'static str;

    /// Parse params and build the typed request. Never touches the network.
    fn prepare(
        &self,
        params: Option<&Value>,
        time_range: Option<&TimeRange>,
    ) -> Result<Box<dyn PreparedQuery>, QueryError>;
}

/// Handler for a paged listing endpoint
pub struct Listing<P, Req, Item> {
    pub display_name: &'static str,
    pub build: fn(&P, Option<&TimeRange>) -> Result<Req, QueryError>,
    pub open: fn(&dyn WorkspaceApi, Req) -> BoxedPager<Item>,
    pub project: fn(Vec<Item>) -> TabularFrame,
}

struct PreparedListing<Req, Item> {
    display_name: &'static str,
    request: Req,
    open: fn(&dyn WorkspaceApi, Req) -> BoxedPager<Item>,
    project: fn(Vec<Item>) -> TabularFrame,
}

impl<Req: Debug, Item> Debug for PreparedListing<Req, Item> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedListing")
            .field("resource", &self.display_name)
            .field("request", &self.request)
            .finish()
    }
}

#[async_trait]
impl<Req, Item> PreparedQuery for PreparedListing<Req, Item>
where
    Req: Debug + Send + 'static,
    Item: Send + 'static,
{
    async fn execute(
        self: Box<Self>,
        api: &dyn WorkspaceApi,
        max_items: NonZeroUsize,
        cancel: &CancellationToken,
    ) -> Result<TabularFrame, QueryError> {
        let PreparedListing {
            display_name,
            request,
            open,
            project,
        } = *self;

        tracing::info!(
            "Querying {} (max items: {}): {:?}",
            display_name,
            max_items,
            request
        );

        let mut pager = open(api, request);
        let items = fetch_with_limit(pager.as_mut(), max_items, cancel)
            .await
            .map_err(|cause| QueryError::Fetch {
                kind: display_name,
                cause,
            })?;

        tracing::debug!("Fetched {} {}", items.len(), display_name);
        Ok(project(items))
    }
}

impl<P, Req, Item> ResourceHandler for Listing<P, Req, Item>
where
    P: DeserializeOwned + 'static,
    Req: Debug + Send + 'static,
    Item: Send + 'static,
{
    fn display_name(&self) -> &'static str {
        self.display_name
    }

    fn prepare(
        &self,
        params: Option<&Value>,
        time_range: Option<&TimeRange>,
    ) -> Result<Box<dyn PreparedQuery>, QueryError> {
        let params: P = parse_params(self.display_name, params)?;
        let request = (self.build)(&params, time_range)?;

        Ok(Box::new(PreparedListing {
            display_name: self.display_name,
            request,
            open: self.open,
            project: self.project,
        }))
    }
}

type Registry = HashMap<ResourceKind, Box<dyn ResourceHandler>>;

/// Global registry, built on first access
static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn get_registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let mut registry: Registry = HashMap::new();

        registry.insert(
            ResourceKind::JobRuns,
            Box::new(Listing::<JobRunParams, ListRunsRequest, BaseRun> {
                display_name: "job runs",
                build: build_list_runs_request,
                open: |api, req| api.list_runs(req),
                project: project_job_runs,
            }),
        );
        registry.insert(
            ResourceKind::PipelineList,
            Box::new(Listing::<PipelineParams, ListPipelinesRequest, PipelineStateInfo> {
                display_name: "pipelines",
                build: build_list_pipelines_request,
                open: |api, req| api.list_pipelines(req),
                project: project_pipelines,
            }),
        );
        registry.insert(
            ResourceKind::PipelineUpdates,
            Box::new(Listing::<PipelineUpdatesParams, ListUpdatesRequest, UpdateInfo> {
                display_name: "pipeline updates",
                build: build_list_updates_request,
                open: |api, req| api.list_updates(req),
                project: project_pipeline_updates,
            }),
        );

        registry
    })
}

/// Get the handler of a resource kind
pub fn get_handler(kind: ResourceKind) -> Option<&'static dyn ResourceHandler> {
    get_registry().get(&kind).map(|h| h.as_ref())
}

/// All registered kinds with their display names, in declaration order
pub fn registered_kinds() -> Vec<(ResourceKind, &'static str)> {
    ResourceKind::ALL
        .into_iter()
        .filter_map(|kind| get_handler(kind).map(|h| (kind, h.display_name())))
        .collect()
}
