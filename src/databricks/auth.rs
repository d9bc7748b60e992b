//! Databricks Authentication
//!
//! OAuth machine-to-machine (client credentials) flow against the
//! workspace token endpoint, with an expiry-aware token cache.

use super::http::DatabricksHttpClient;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Scope granting access to all workspace REST APIs
pub const DEFAULT_SCOPE: &str = "all-apis";

/// Token endpoint path relative to the workspace URL
const TOKEN_PATH: &str = "/oidc/v1/token";

/// Tokens are renewed this long before their reported expiry
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// TTL assumed when the endpoint reports none
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Service principal credentials with token caching
#[derive(Clone)]
pub struct OAuthCredentials {
    token_url: String,
    client_id: String,
    client_secret: String,
    http: DatabricksHttpClient,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl OAuthCredentials {
    pub fn new(
        workspace_url: &str,
        client_id: &str,
        client_secret: &str,
        http: DatabricksHttpClient,
    ) -> Self {
        Self {
            token_url: format!("{}{}", workspace_url, TOKEN_PATH),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            http,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Cached token if still valid, otherwise a fresh one from the token endpoint
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let form = [("grant_type", "client_credentials"), ("scope", DEFAULT_SCOPE)];
        let response = self
            .http
            .post_form(&self.token_url, &self.client_id, &self.client_secret, &form)
            .await
            .context("Failed to get access token")?;

        let token: TokenResponse =
            serde_json::from_value(response).context("Malformed token response")?;

        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.access_token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token.access_token)
    }
}
