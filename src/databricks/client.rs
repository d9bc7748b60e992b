//! Databricks Workspace Client
//!
//! Main client for the workspace REST API, combining authentication and
//! HTTP functionality. Cheap to clone: the connection pool and the token
//! cache are shared between clones.

use super::auth::OAuthCredentials;
use super::http::DatabricksHttpClient;
use super::listing::{BoxedPager, HttpListing};
use super::WorkspaceApi;
use crate::resource::models::{BaseRun, PipelineStateInfo, UpdateInfo};
use crate::resource::request::{ListPipelinesRequest, ListRunsRequest, ListUpdatesRequest};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

const RUNS_LIST_PATH: &str = "/api/2.1/jobs/runs/list";
const PIPELINES_PATH: &str = "/api/2.0/pipelines";
const CURRENT_USER_PATH: &str = "/api/2.0/preview/scim/v2/Me";

/// Main Databricks workspace client
#[derive(Clone)]
pub struct WorkspaceClient {
    pub credentials: OAuthCredentials,
    pub http: DatabricksHttpClient,
    pub workspace_url: String,
}

impl WorkspaceClient {
    /// Create a client for a normalized workspace URL (no trailing slash)
    pub fn new(workspace_url: &str, client_id: &str, client_secret: &str) -> Result<Self> {
        let http = DatabricksHttpClient::new()?;
        let credentials = OAuthCredentials::new(workspace_url, client_id, client_secret, http.clone());

        Ok(Self {
            credentials,
            http,
            workspace_url: workspace_url.to_string(),
        })
    }

    /// Build an API URL from a path
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.workspace_url, path)
    }

    /// Make a GET request to a workspace API
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        page_token: Option<&str>,
    ) -> Result<Value> {
        let token = self.credentials.get_token().await?;
        self.http
            .get(&self.api_url(path), &token, query, page_token)
            .await
    }

    /// Identity of the authenticated principal
    pub async fn current_user(&self) -> Result<Value> {
        self.get_with_query(CURRENT_USER_PATH, &[("attributes", "userName")], None)
            .await
    }
}

impl WorkspaceApi for WorkspaceClient {
    fn list_runs(&self, request: ListRunsRequest) -> BoxedPager<BaseRun> {
        Box::new(HttpListing::new(
            self.clone(),
            RUNS_LIST_PATH.to_string(),
            request,
            "runs",
        ))
    }

    fn list_pipelines(&self, request: ListPipelinesRequest) -> BoxedPager<PipelineStateInfo> {
        Box::new(HttpListing::new(
            self.clone(),
            PIPELINES_PATH.to_string(),
            request,
            "statuses",
        ))
    }

    fn list_updates(&self, request: ListUpdatesRequest) -> BoxedPager<UpdateInfo> {
        let path = format!(
            "{}/{}/updates",
            PIPELINES_PATH,
            urlencoding::encode(&request.pipeline_id)
        );
        Box::new(HttpListing::new(self.clone(), path, request, "updates"))
    }
}
