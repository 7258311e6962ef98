//! Identity resolution for external machine and tag identifiers.
//!
//! External systems address devices and events either by the internal id
//! (automated pipelines) or by an operator-assigned alias (legacy and
//! third-party machine integrations). Resolution tries the cheap, index-free
//! point lookup first and only falls back to the alias index scan on a miss,
//! so an id match always wins over an alias match.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::model::{Device, Event, NodeKind};
use crate::store::{HierarchyStore, StoreError};

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that can occur while resolving an external identifier.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unable to match machine identifier ({0}) to a device")]
    DeviceNotFound(String),

    #[error("Unable to match '{0}' to an event")]
    EventNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves external identifiers to Device and Event records.
pub struct IdentityResolver {
    store: Arc<dyn HierarchyStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn HierarchyStore>) -> Self {
        Self { store }
    }

    /// Resolve a machine identifier to a Device, by id first, then by alias.
    pub async fn resolve_device(&self, machine_id: &str) -> Result<Device> {
        if let Some(device) = self
            .store
            .get_by_id(machine_id, NodeKind::Device)
            .await?
            .and_then(|r| r.into_device())
        {
            return Ok(device);
        }

        debug!(machine_id = %machine_id, "No device id match, falling back to alias scan");

        self.store
            .query_by_alias(NodeKind::Device, machine_id)
            .await?
            .into_iter()
            .find_map(|r| r.into_device())
            .ok_or_else(|| ResolveError::DeviceNotFound(machine_id.to_string()))
    }

    /// Resolve a `{tag}_{value}` composite key to an Event, by id first,
    /// then by alias.
    pub async fn resolve_event(&self, key: &str) -> Result<Event> {
        if let Some(event) = self
            .store
            .get_by_id(key, NodeKind::Event)
            .await?
            .and_then(|r| r.into_event())
        {
            return Ok(event);
        }

        debug!(key = %key, "No event id match, falling back to alias scan");

        self.store
            .query_by_alias(NodeKind::Event, key)
            .await?
            .into_iter()
            .find_map(|r| r.into_event())
            .ok_or_else(|| ResolveError::EventNotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HierarchyRecord;
    use crate::store::MockHierarchyStore;

    fn device(id: &str, alias: Option<&str>) -> HierarchyRecord {
        HierarchyRecord::Device(Device {
            id: id.to_string(),
            name: format!("{}-name", id),
            parent_id: "sta-1".to_string(),
            alias: alias.map(str::to_string),
        })
    }

    fn event(id: &str, alias: Option<&str>) -> HierarchyRecord {
        HierarchyRecord::Event(Event {
            id: id.to_string(),
            name: format!("{}-name", id),
            parent_id: "proc-1".to_string(),
            priority: "high".to_string(),
            event_type: None,
            alias: alias.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_resolve_device_by_id() {
        let store = Arc::new(MockHierarchyStore::new());
        store.insert(device("dev-1", None)).await;

        let resolver = IdentityResolver::new(store);
        let resolved = resolver.resolve_device("dev-1").await.unwrap();
        assert_eq!(resolved.id, "dev-1");
    }

    #[tokio::test]
    async fn test_resolve_device_by_alias_fallback() {
        let store = Arc::new(MockHierarchyStore::new());
        store.insert(device("dev-1", Some("machine-4"))).await;

        let resolver = IdentityResolver::new(store);
        let resolved = resolver.resolve_device("machine-4").await.unwrap();
        assert_eq!(resolved.id, "dev-1");
    }

    #[tokio::test]
    async fn test_id_match_wins_over_alias() {
        // One device whose id is "m1", another that carries "m1" as an alias.
        let store = Arc::new(MockHierarchyStore::new());
        store.insert(device("m1", None)).await;
        store.insert(device("dev-2", Some("m1"))).await;

        let resolver = IdentityResolver::new(store);
        let resolved = resolver.resolve_device("m1").await.unwrap();
        assert_eq!(resolved.id, "m1");
    }

    #[tokio::test]
    async fn test_resolve_device_not_found_names_identifier() {
        let store = Arc::new(MockHierarchyStore::new());
        let resolver = IdentityResolver::new(store);

        let err = resolver.resolve_device("ghost").await.unwrap_err();
        assert!(matches!(err, ResolveError::DeviceNotFound(_)));
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn test_resolve_event_by_alias() {
        let store = Arc::new(MockHierarchyStore::new());
        store.insert(event("evt-1", Some("temp_001"))).await;

        let resolver = IdentityResolver::new(store);
        let resolved = resolver.resolve_event("temp_001").await.unwrap();
        assert_eq!(resolved.id, "evt-1");

        let err = resolver.resolve_event("temp_002").await.unwrap_err();
        assert!(matches!(err, ResolveError::EventNotFound(_)));
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let store = Arc::new(MockHierarchyStore::new());
        store.set_fail_on_get(true).await;

        let resolver = IdentityResolver::new(store);
        let err = resolver.resolve_device("dev-1").await.unwrap_err();
        assert!(matches!(err, ResolveError::Store(_)));
    }
}
