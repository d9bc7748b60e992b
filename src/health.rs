//! Health Check
//!
//! Verifies that the settings are complete and that the workspace accepts
//! the configured credentials.

use crate::config::Settings;
use crate::databricks::client::WorkspaceClient;
use crate::databricks::http::format_api_error;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResult {
    pub status: HealthStatus,
    pub message: String,
}

impl HealthResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Ok,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

/// Check settings, then ask the workspace who we are.
/// No request is made when credentials are missing.
pub async fn check_health(settings: &Settings, cancel: &CancellationToken) -> HealthResult {
    if !settings.has_client_credentials() {
        return HealthResult::error("Authentication is missing");
    }

    let creds = match settings.credentials() {
        Ok(creds) => creds,
        Err(e) => return HealthResult::error(format!("Unable to load settings: {:#}", e)),
    };

    let client =
        match WorkspaceClient::new(&creds.workspace_url, &creds.client_id, &creds.client_secret) {
            Ok(client) => client,
            Err(e) => return HealthResult::error(format!("Failed to create client: {:#}", e)),
        };

    let me = tokio::select! {
        _ = cancel.cancelled() => return HealthResult::error("Health check cancelled"),
        me = client.current_user() => me,
    };

    match me {
        Ok(user) => {
            let name = user
                .get("userName")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            tracing::info!("Health check passed as {}", name);
            HealthResult::ok("Data source is working")
        }
        Err(e) => {
            tracing::error!("Health check failed: {:#}", e);
            HealthResult::error(format_api_error(&e))
        }
    }
}
