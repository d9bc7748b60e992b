//! Resource abstraction layer
//!
//! Everything that differs per resource kind lives here, behind the
//! registry: how filter params become a typed request, how many items to
//! pull from the listing, and how the records become a frame.
//!
//! # Architecture
//!
//! - [`registry`] - Maps resource kinds to their handlers
//! - [`request`] - Validates params and builds typed listing requests
//! - [`fetcher`] - Drains a paged listing up to a result cap
//! - [`projection`] - Shapes fetched records into tabular frames
//! - [`models`] - Records returned by the listing endpoints
//!
//! # Example
//!
//! ```ignore
//! use dbxq::resource::{get_handler, ResourceKind};
//!
//! async fn list_runs(api: &dyn WorkspaceApi, cancel: &CancellationToken) -> Result<TabularFrame, QueryError> {
//!     let handler = get_handler(ResourceKind::JobRuns).unwrap();
//!     let prepared = handler.prepare(Some(&json!({"jobId": "42"})), None)?;
//!     prepared.execute(api, NonZeroUsize::new(100).unwrap(), cancel).await
//! }
//! ```

pub mod fetcher;
pub mod models;
pub mod projection;
pub mod registry;
pub mod request;

pub use fetcher::fetch_with_limit;
pub use registry::{get_handler, registered_kinds, PreparedQuery, ResourceHandler, ResourceKind};
pub use request::TimeRange;
