//! Upward traversal of the data hierarchy.
//!
//! Follows `parentId` back-references one level at a time with the expected
//! type at each step, so a missing or mistyped parent fails with a precise
//! per-level error. When both a Device-rooted chain (Station → Area → Site)
//! and an Event-rooted chain (Process → Area) are resolved for the same
//! incident, the Areas reached via each path must agree; a mismatch aborts
//! processing rather than best-effort merging.

use std::sync::Arc;

use thiserror::Error;

use crate::model::{Area, Device, Event, HierarchyRecord, NodeKind, Process, Site, Station};
use crate::store::{HierarchyStore, StoreError};

/// Result type for walk operations.
pub type Result<T> = std::result::Result<T, WalkError>;

/// Errors that can occur while walking the hierarchy.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Unable to find {kind} by ID ({id})")]
    MissingNode { kind: NodeKind, id: String },

    #[error("Expected a {expected} for ID ({id}) but found a {found}")]
    UnexpectedKind {
        expected: NodeKind,
        found: NodeKind,
        id: String,
    },

    #[error("Process and Station must be under the same Area")]
    AreaMismatch,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The Device-rooted chain.
#[derive(Debug, Clone)]
pub struct DeviceChain {
    pub station: Station,
    pub area: Area,
    pub site: Site,
}

/// Both chains for a single incident, Area-consistency verified.
#[derive(Debug, Clone)]
pub struct FullChain {
    pub station: Station,
    pub area: Area,
    pub site: Site,
    pub process: Process,
}

/// Walks `parentId` pointers upward through the hierarchy store.
pub struct HierarchyWalker {
    store: Arc<dyn HierarchyStore>,
}

impl HierarchyWalker {
    pub fn new(store: Arc<dyn HierarchyStore>) -> Self {
        Self { store }
    }

    /// Resolve Station → Area → Site above a device.
    pub async fn device_chain(&self, device: &Device) -> Result<DeviceChain> {
        let station = self.station(&device.parent_id).await?;
        let area = self.area(&station.parent_id).await?;
        let site = self.site(&area.parent_id).await?;

        Ok(DeviceChain {
            station,
            area,
            site,
        })
    }

    /// Resolve the Process above an event.
    pub async fn event_process(&self, event: &Event) -> Result<Process> {
        self.process(&event.parent_id).await
    }

    /// Resolve both chains and verify that the event's Process and the
    /// device's Station sit under the same Area.
    pub async fn full_chain(&self, device: &Device, event: &Event) -> Result<FullChain> {
        let DeviceChain {
            station,
            area,
            site,
        } = self.device_chain(device).await?;
        let process = self.event_process(event).await?;

        if process.parent_id != station.parent_id {
            return Err(WalkError::AreaMismatch);
        }

        Ok(FullChain {
            station,
            area,
            site,
            process,
        })
    }

    async fn fetch(&self, kind: NodeKind, id: &str) -> Result<HierarchyRecord> {
        self.store
            .get_by_id(id, kind)
            .await?
            .ok_or_else(|| WalkError::MissingNode {
                kind,
                id: id.to_string(),
            })
    }

    async fn station(&self, id: &str) -> Result<Station> {
        let record = self.fetch(NodeKind::Station, id).await?;
        let found = record.kind();
        record.into_station().ok_or(WalkError::UnexpectedKind {
            expected: NodeKind::Station,
            found,
            id: id.to_string(),
        })
    }

    async fn area(&self, id: &str) -> Result<Area> {
        let record = self.fetch(NodeKind::Area, id).await?;
        let found = record.kind();
        record.into_area().ok_or(WalkError::UnexpectedKind {
            expected: NodeKind::Area,
            found,
            id: id.to_string(),
        })
    }

    async fn site(&self, id: &str) -> Result<Site> {
        let record = self.fetch(NodeKind::Site, id).await?;
        let found = record.kind();
        record.into_site().ok_or(WalkError::UnexpectedKind {
            expected: NodeKind::Site,
            found,
            id: id.to_string(),
        })
    }

    async fn process(&self, id: &str) -> Result<Process> {
        let record = self.fetch(NodeKind::Process, id).await?;
        let found = record.kind();
        record.into_process().ok_or(WalkError::UnexpectedKind {
            expected: NodeKind::Process,
            found,
            id: id.to_string(),
        })
    }
}
