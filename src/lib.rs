//! dbxq - Databricks query adapter
//!
//! Turns job run and pipeline listings of a Databricks workspace into
//! tabular frames. A batch of query descriptors goes in, a frame or a
//! classified error per `refId` comes out.

pub mod config;
pub mod databricks;
pub mod error;
pub mod frame;
pub mod health;
pub mod query;
pub mod resource;
