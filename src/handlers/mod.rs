//! Ingestion entry points.
//!
//! Two inbound shapes are accepted, dispatched by structure:
//! - a storage-change batch (`Records` array) from the anomaly-detection
//!   bucket, handled with per-record failure tolerance
//! - a telemetry message batch (`messages` array) from the machine topic,
//!   where any failure aborts the invocation
//!
//! Each invocation is one sequential pipeline: resolve identity, walk the
//! hierarchy, check the dedup gate, publish. No retries happen here; the
//! surrounding invocation environment owns timeouts and redelivery.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::object_store::{FetchError, ObjectFetcher};
use crate::publisher::{IssuePublisher, PublishError};
use crate::resolver::{IdentityResolver, ResolveError};
use crate::store::{HierarchyStore, IssueStore, StoreError};
use crate::walker::{HierarchyWalker, WalkError};

mod anomaly;
mod telemetry;


pub use anomaly::{S3Bucket, S3Entity, S3Object, StorageEventBatch, StorageRecord};
pub use telemetry::{TelemetryBatch, TelemetryMessage};

/// Errors surfaced by the ingestion handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid handler input: {0}")]
    InvalidInput(String),

    #[error("Message was missing the '{0}' property")]
    MissingMessageField(&'static str),

    #[error("Message name could not be split by the '{0}' character")]
    UnsplittableName(String),

    #[error("An unresolved issue exists for this event on this device")]
    UnresolvedIssueExists,

    #[error("Machine ID was not supplied")]
    MissingMachineId,

    #[error("Anomaly data did not contain a prediction score")]
    MissingPrediction,

    #[error("Anomaly data did not contain diagnostic information")]
    MissingDiagnostics,

    #[error("Unable to find any processes under Area ({0})")]
    NoProcesses(String),

    #[error("Unable to find any automated events under Area ({0})")]
    NoAutomatedEvents(String),

    #[error("Malformed anomaly record: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// An inbound invocation payload, dispatched by shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InboundEvent {
    /// Storage-change notification batch (has a `Records` array).
    Storage(StorageEventBatch),
    /// Telemetry message batch (has a `messages` array).
    Telemetry(TelemetryBatch),
}

/// Orchestrates the ingestion pipeline over injected collaborators.
pub struct IntegrationsHandler {
    pub(crate) hierarchy: Arc<dyn HierarchyStore>,
    pub(crate) issues: Arc<dyn IssueStore>,
    pub(crate) objects: Arc<dyn ObjectFetcher>,
    pub(crate) publisher: Arc<dyn IssuePublisher>,
    pub(crate) resolver: IdentityResolver,
    pub(crate) walker: HierarchyWalker,
    pub(crate) name_delimiter: String,
}

impl IntegrationsHandler {
    pub fn new(
        hierarchy: Arc<dyn HierarchyStore>,
        issues: Arc<dyn IssueStore>,
        objects: Arc<dyn ObjectFetcher>,
        publisher: Arc<dyn IssuePublisher>,
        name_delimiter: impl Into<String>,
    ) -> Self {
        let resolver = IdentityResolver::new(hierarchy.clone());
        let walker = HierarchyWalker::new(hierarchy.clone());

        Self {
            hierarchy,
            issues,
            objects,
            publisher,
            resolver,
            walker,
            name_delimiter: name_delimiter.into(),
        }
    }

    /// Process one inbound invocation payload.
    ///
    /// Storage batches tolerate per-record failures and always return `Ok`
    /// once the batch has been walked; telemetry failures abort.
    pub async fn handle(&self, event: Value) -> Result<(), HandlerError> {
        let event: InboundEvent = serde_json::from_value(event)
            .map_err(|e| HandlerError::InvalidInput(format!("unsupported event shape: {}", e)))?;

        match event {
            InboundEvent::Storage(batch) => {
                self.handle_storage_batch(batch).await;
                Ok(())
            }
            InboundEvent::Telemetry(batch) => self.handle_telemetry(batch).await,
        }
    }
}
