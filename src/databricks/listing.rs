//! Paged Listings
//!
//! Pull-based cursor over a remote result set that is split into pages.
//! Every call takes the ambient [`CancellationToken`] so a deadline can
//! interrupt an in-flight page request.

use super::client::WorkspaceClient;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

/// Cursor over a paged remote listing
#[async_trait]
pub trait PagedIterator<T>: Send {
    /// Whether another item is available. May fetch the next page.
    async fn has_next(&mut self, cancel: &CancellationToken) -> bool;

    /// Take the next item. A failed page fetch surfaces here.
    async fn next(&mut self, cancel: &CancellationToken) -> Result<T>;
}

pub type BoxedPager<T> = Box<dyn PagedIterator<T>>;

/// Databricks list endpoint paged with `page_token` / `next_page_token`
pub struct HttpListing<Q, T> {
    client: WorkspaceClient,
    path: String,
    query: Q,
    /// Response field holding the page items
    items_field: &'static str,
    buffer: VecDeque<T>,
    next_token: Option<String>,
    started: bool,
    pending_error: Option<anyhow::Error>,
}

impl<Q, T> HttpListing<Q, T>
where
    Q: Serialize + Send + Sync,
    T: DeserializeOwned + Send,
{
    pub fn new(client: WorkspaceClient, path: String, query: Q, items_field: &'static str) -> Self {
        Self {
            client,
            path,
            query,
            items_field,
            buffer: VecDeque::new(),
            next_token: None,
            started: false,
            pending_error: None,
        }
    }

    fn exhausted(&self) -> bool {
        self.started && self.next_token.is_none()
    }

    async fn fetch_page(&mut self, cancel: &CancellationToken) -> Result<()> {
        let page_token = self.next_token.take();
        tracing::debug!(
            "Fetching page of {} (token: {})",
            self.path,
            page_token.as_deref().unwrap_or("<first>")
        );

        let request = self
            .client
            .get_with_query(&self.path, &self.query, page_token.as_deref());

        let response = tokio::select! {
            () = cancel.cancelled() => return Err(anyhow!("request cancelled: {}", self.path)),
            response = request => response?,
        };

        self.started = true;
        let (items, next_token) = parse_page(response, self.items_field)
            .with_context(|| format!("Failed to decode page of {}", self.path))?;
        self.buffer.extend(items);
        self.next_token = next_token;

        Ok(())
    }
}

#[async_trait]
impl<Q, T> PagedIterator<T> for HttpListing<Q, T>
where
    Q: Serialize + Send + Sync,
    T: DeserializeOwned + Send,
{
    async fn has_next(&mut self, cancel: &CancellationToken) -> bool {
        if !self.buffer.is_empty() || self.pending_error.is_some() {
            return true;
        }

        // Empty pages carrying a token are skipped
        while self.buffer.is_empty() && !self.exhausted() {
            if let Err(e) = self.fetch_page(cancel).await {
                self.pending_error = Some(e);
                return true;
            }
        }

        !self.buffer.is_empty()
    }

    async fn next(&mut self, cancel: &CancellationToken) -> Result<T> {
        if self.buffer.is_empty() && self.pending_error.is_none() && !self.has_next(cancel).await {
            return Err(anyhow!("no more items in {}", self.path));
        }

        if let Some(e) = self.pending_error.take() {
            return Err(e);
        }

        self.buffer
            .pop_front()
            .ok_or_else(|| anyhow!("no more items in {}", self.path))
    }
}

/// Split a list response into its items and the next page token
fn parse_page<T: DeserializeOwned>(
    mut response: Value,
    items_field: &str,
) -> Result<(Vec<T>, Option<String>)> {
    let items = match response.get_mut(items_field).map(Value::take) {
        None | Some(Value::Null) => Vec::new(),
        Some(raw) => serde_json::from_value(raw)?,
    };

    let next_token = response
        .get("next_page_token")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok((items, next_token))
}
