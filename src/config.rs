//! Configuration Management
//!
//! Handles persistent configuration storage for dbxq and resolves the
//! effective settings (CLI > environment > config file > defaults).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ENV_HOST: &str = "DATABRICKS_HOST";
pub const ENV_CLIENT_ID: &str = "DATABRICKS_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "DATABRICKS_CLIENT_SECRET";

/// Result cap used when a query does not carry a `limit`
pub const DEFAULT_LIMIT: usize = 200;

/// Deadline for a whole batch
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Workspace URL, e.g. https://dbc-1234.cloud.databricks.com
    #[serde(default)]
    pub workspace: Option<String>,
    /// Service principal client id
    #[serde(default)]
    pub client_id: Option<String>,
    /// Service principal secret (prefer DATABRICKS_CLIENT_SECRET)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub default_limit: Option<usize>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dbxq").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path().context("No config directory on this platform")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Resolve effective settings against the process environment
    pub fn settings(&self, cli_workspace: Option<&str>) -> Settings {
        self.settings_with_env(cli_workspace, |key| std::env::var(key).ok())
    }

    /// Resolve effective settings (CLI > env > config > default)
    pub fn settings_with_env<F>(&self, cli_workspace: Option<&str>, env: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |cli: Option<&str>, key: &str, file: &Option<String>| {
            cli.map(str::to_string)
                .or_else(|| env(key))
                .or_else(|| file.clone())
                .filter(|v| !v.trim().is_empty())
        };

        let default_limit = self
            .default_limit
            .and_then(NonZeroUsize::new)
            .or_else(|| NonZeroUsize::new(DEFAULT_LIMIT))
            .unwrap_or(NonZeroUsize::MIN);

        Settings {
            workspace: pick(cli_workspace, ENV_HOST, &self.workspace),
            client_id: pick(None, ENV_CLIENT_ID, &self.client_id),
            client_secret: pick(None, ENV_CLIENT_SECRET, &self.client_secret),
            default_limit,
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

/// Effective settings for one process run
#[derive(Debug, Clone)]
pub struct Settings {
    pub workspace: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub default_limit: NonZeroUsize,
    pub timeout: Duration,
}

/// Everything needed to build an authenticated workspace client
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceCredentials {
    pub workspace_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Settings {
    pub fn has_client_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    pub fn credentials(&self) -> Result<WorkspaceCredentials> {
        let workspace = self
            .workspace
            .as_deref()
            .ok_or_else(|| anyhow!("Workspace URL is not configured (set {})", ENV_HOST))?;
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            return Err(anyhow!(
                "Authentication is missing (set {} and {})",
                ENV_CLIENT_ID,
                ENV_CLIENT_SECRET
            ));
        };

        Ok(WorkspaceCredentials {
            workspace_url: normalize_workspace_url(workspace)?,
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
        })
    }
}

/// Normalize a workspace URL: default to https, drop the trailing slash
pub fn normalize_workspace_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&with_scheme)
        .with_context(|| format!("Invalid workspace URL: {}", raw))?;
    if url.host_str().is_none() {
        return Err(anyhow!("Invalid workspace URL: {} (no host)", raw));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
