//! Resource Fetcher
//!
//! Drains a paged listing up to a result cap.

use crate::databricks::PagedIterator;
use anyhow::Result;
use std::num::NonZeroUsize;
use tokio_util::sync::CancellationToken;

/// Fetch at most `max_items` items from `iter`.
///
/// The cap is checked before asking for more, so no page beyond the one
/// holding the last wanted item is requested. Any `next` failure aborts the
/// whole fetch and the items pulled so far are dropped.
pub async fn fetch_with_limit<T, I>(
    iter: &mut I,
    max_items: NonZeroUsize,
    cancel: &CancellationToken,
) -> Result<Vec<T>>
where
    I: PagedIterator<T> + ?Sized,
{
    let mut items = Vec::new();

    while items.len() < max_items.get() && iter.has_next(cancel).await {
        let item = iter.next(cancel).await?;
        items.push(item);
    }

    Ok(items)
}
