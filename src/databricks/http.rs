//! HTTP utilities for Databricks REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Longest error body prefix written to the log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Per-request timeout; the ambient cancellation token bounds the whole query
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Strip control characters and truncate a body for the log
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for Databricks API calls
#[derive(Clone)]
pub struct DatabricksHttpClient {
    client: Client,
}

impl DatabricksHttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("dbxq/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request with query parameters and an optional page token
    pub async fn get<Q: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        query: &Q,
        page_token: Option<&str>,
    ) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url).bearer_auth(token).query(query);
        if let Some(page_token) = page_token {
            request = request.query(&[("page_token", page_token)]);
        }
        let body = send(request).await?;

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }

    /// POST a form with basic auth (OAuth token endpoint)
    pub async fn post_form<F: Serialize + ?Sized>(
        &self,
        url: &str,
        username: &str,
        password: &str,
        form: &F,
    ) -> Result<Value> {
        tracing::debug!("POST {}", url);

        let request = self
            .client
            .post(url)
            .basic_auth(username, Some(password))
            .form(form);
        let body = send(request).await?;

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

async fn send(request: RequestBuilder) -> Result<String> {
    let response = request.send().await.context("Failed to send request")?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    if !status.is_success() {
        // Bodies may echo request details, log a truncated copy only
        tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
        return Err(anyhow::anyhow!("API request failed: {}", status));
    }

    Ok(body)
}

/// Format a Databricks API error for display
/// Maps well-known status codes to actionable messages
pub fn format_api_error(error: &anyhow::Error) -> String {
    let error_str = format!("{:#}", error);

    if error_str.contains("401") {
        return "Authentication failed. Check the client id and secret.".to_string();
    }
    if error_str.contains("403") {
        return "Permission denied. Check the service principal's workspace permissions."
            .to_string();
    }
    if error_str.contains("404") {
        return "Resource not found.".to_string();
    }
    if error_str.contains("429") {
        return "Rate limit exceeded. Please try again later.".to_string();
    }
    if error_str.contains("500") || error_str.contains("503") {
        return "Databricks service temporarily unavailable. Please try again.".to_string();
    }

    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(120)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
