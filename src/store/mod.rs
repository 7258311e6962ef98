//! Key-value store access.
//!
//! This module contains:
//! - `HierarchyStore` trait: typed point-lookups and secondary-index scans
//!   over the denormalized hierarchy table
//! - `IssueStore` trait: the open-issue deduplication gate
//! - Implementations: DynamoDB, in-memory mock
//!
//! All operations are read-only. Store errors propagate to the caller
//! unmodified; retries, if any, belong to the transport.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{HierarchyRecord, NodeKind};

pub mod dynamo;
pub mod mock;

pub use dynamo::{DynamoHierarchyStore, DynamoIssueStore};
pub use mock::{MockHierarchyStore, MockIssueStore};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("DynamoDB get_item failed: {0}")]
    Get(String),

    #[error("DynamoDB query failed: {0}")]
    Query(String),

    #[error("Malformed hierarchy item: {0}")]
    Malformed(String),
}

/// Read access to the denormalized hierarchy table.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// Single-item point lookup by primary id and type discriminant.
    async fn get_by_id(&self, id: &str, kind: NodeKind) -> Result<Option<HierarchyRecord>>;

    /// All records of `kind` under `parent_id`, across all result pages.
    async fn query_by_parent(&self, kind: NodeKind, parent_id: &str)
        -> Result<Vec<HierarchyRecord>>;

    /// All records of `kind` carrying `alias`, across all result pages.
    /// Used only as a fallback when an id lookup misses.
    async fn query_by_alias(&self, kind: NodeKind, alias: &str) -> Result<Vec<HierarchyRecord>>;
}

/// Deduplication gate over the issues table.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Whether an issue for this device+event pair exists that has not been
    /// closed yet. Implementations may stop paginating on the first hit.
    async fn has_unresolved_issue(&self, event_id: &str, device_name: &str) -> Result<bool>;
}
