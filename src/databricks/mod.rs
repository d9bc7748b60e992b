//! Databricks API interaction module
//!
//! This module provides the remote side of every query: authentication,
//! the HTTP client, and paged listings over the workspace REST API.
//!
//! # Module Structure
//!
//! - [`auth`] - OAuth client-credentials tokens with caching
//! - [`client`] - Workspace client implementing [`WorkspaceApi`]
//! - [`http`] - HTTP utilities for REST API calls
//! - [`listing`] - Paged iterator abstraction and its HTTP implementation
//!
//! # Example
//!
//! ```ignore
//! use dbxq::databricks::{client::WorkspaceClient, PagedIterator, WorkspaceApi};
//! use dbxq::resource::request::ListRunsRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn example(cancel: &CancellationToken) -> anyhow::Result<()> {
//!     let client = WorkspaceClient::new("https://dbc-1.cloud.databricks.com", "id", "secret")?;
//!     let mut runs = client.list_runs(ListRunsRequest::default());
//!     while runs.has_next(cancel).await {
//!         println!("{:?}", runs.next(cancel).await?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod listing;

use crate::config::Settings;
use crate::query::ClientProvider;
use crate::resource::models::{BaseRun, PipelineStateInfo, UpdateInfo};
use crate::resource::request::{ListPipelinesRequest, ListRunsRequest, ListUpdatesRequest};
use anyhow::Result;
use async_trait::async_trait;
use client::WorkspaceClient;
use listing::BoxedPager;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

pub use listing::PagedIterator;

/// Listing capabilities of a workspace, one per resource kind.
/// Opening a listing is lazy: no request is made until the pager is polled.
pub trait WorkspaceApi: Send + Sync {
    fn list_runs(&self, request: ListRunsRequest) -> BoxedPager<BaseRun>;
    fn list_pipelines(&self, request: ListPipelinesRequest) -> BoxedPager<PipelineStateInfo>;
    fn list_updates(&self, request: ListUpdatesRequest) -> BoxedPager<UpdateInfo>;
}

/// Builds the workspace client from settings on first use and shares it
/// with every later sub-query.
pub struct DatabricksProvider {
    settings: Settings,
    client: OnceCell<Arc<WorkspaceClient>>,
}

impl DatabricksProvider {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    fn build_client(&self) -> Result<Arc<WorkspaceClient>> {
        let creds = self.settings.credentials()?;
        tracing::info!("Connecting to workspace {}", creds.workspace_url);
        let client = WorkspaceClient::new(
            &creds.workspace_url,
            &creds.client_id,
            &creds.client_secret,
        )?;
        Ok(Arc::new(client))
    }
}

#[async_trait]
impl ClientProvider for DatabricksProvider {
    async fn workspace(&self, _cancel: &CancellationToken) -> Result<Arc<dyn WorkspaceApi>> {
        let client = self
            .client
            .get_or_try_init(|| async { self.build_client() })
            .await?;
        let client: Arc<dyn WorkspaceApi> = client.clone();
        Ok(client)
    }
}
