//! Mock store implementations for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{HierarchyRecord, NodeKind};
use crate::store::{HierarchyStore, IssueStore, Result, StoreError};

/// Mock hierarchy store holding records in memory.
#[derive(Default)]
pub struct MockHierarchyStore {
    records: RwLock<Vec<HierarchyRecord>>,
    fail_on_get: RwLock<bool>,
    fail_on_query: RwLock<bool>,
}

impl MockHierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: HierarchyRecord) {
        self.records.write().await.push(record);
    }

    pub async fn set_fail_on_get(&self, fail: bool) {
        *self.fail_on_get.write().await = fail;
    }

    pub async fn set_fail_on_query(&self, fail: bool) {
        *self.fail_on_query.write().await = fail;
    }
}

#[async_trait]
impl HierarchyStore for MockHierarchyStore {
    async fn get_by_id(&self, id: &str, kind: NodeKind) -> Result<Option<HierarchyRecord>> {
        if *self.fail_on_get.read().await {
            return Err(StoreError::Get("mock get failure".to_string()));
        }
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.kind() == kind && r.id() == id)
            .cloned())
    }

    async fn query_by_parent(
        &self,
        kind: NodeKind,
        parent_id: &str,
    ) -> Result<Vec<HierarchyRecord>> {
        if *self.fail_on_query.read().await {
            return Err(StoreError::Query("mock query failure".to_string()));
        }
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.kind() == kind && r.parent_id() == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn query_by_alias(&self, kind: NodeKind, alias: &str) -> Result<Vec<HierarchyRecord>> {
        if *self.fail_on_query.read().await {
            return Err(StoreError::Query("mock query failure".to_string()));
        }
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.kind() == kind && r.alias() == Some(alias))
            .cloned()
            .collect())
    }
}

/// Mock issue store tracking open (device, event) pairs.
#[derive(Default)]
pub struct MockIssueStore {
    open: RwLock<Vec<(String, String)>>,
    fail_on_query: RwLock<bool>,
}

impl MockIssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unresolved issue for a device+event pair.
    pub async fn open_issue(&self, device_name: impl Into<String>, event_id: impl Into<String>) {
        self.open
            .write()
            .await
            .push((device_name.into(), event_id.into()));
    }

    pub async fn set_fail_on_query(&self, fail: bool) {
        *self.fail_on_query.write().await = fail;
    }
}

#[async_trait]
impl IssueStore for MockIssueStore {
    async fn has_unresolved_issue(&self, event_id: &str, device_name: &str) -> Result<bool> {
        if *self.fail_on_query.read().await {
            return Err(StoreError::Query("mock query failure".to_string()));
        }
        Ok(self
            .open
            .read()
            .await
            .iter()
            .any(|(d, e)| d == device_name && e == event_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Device, Station};

    #[tokio::test]
    async fn test_mock_hierarchy_store_filters_by_kind_and_parent() {
        let store = MockHierarchyStore::new();
        store
            .insert(HierarchyRecord::Station(Station {
                id: "sta-1".to_string(),
                name: "station 1".to_string(),
                parent_id: "area-1".to_string(),
            }))
            .await;
        store
            .insert(HierarchyRecord::Device(Device {
                id: "dev-1".to_string(),
                name: "press".to_string(),
                parent_id: "sta-1".to_string(),
                alias: Some("machine-4".to_string()),
            }))
            .await;

        let stations = store
            .query_by_parent(NodeKind::Station, "area-1")
            .await
            .unwrap();
        assert_eq!(stations.len(), 1);

        let devices = store
            .query_by_parent(NodeKind::Device, "area-1")
            .await
            .unwrap();
        assert!(devices.is_empty());

        let by_alias = store
            .query_by_alias(NodeKind::Device, "machine-4")
            .await
            .unwrap();
        assert_eq!(by_alias.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_issue_store_gate() {
        let store = MockIssueStore::new();
        assert!(!store.has_unresolved_issue("evt-1", "press").await.unwrap());

        store.open_issue("press", "evt-1").await;
        assert!(store.has_unresolved_issue("evt-1", "press").await.unwrap());
        assert!(!store.has_unresolved_issue("evt-2", "press").await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_fail_toggles() {
        let store = MockHierarchyStore::new();
        store.set_fail_on_get(true).await;
        assert!(store.get_by_id("x", NodeKind::Site).await.is_err());

        let issues = MockIssueStore::new();
        issues.set_fail_on_query(true).await;
        assert!(issues.has_unresolved_issue("e", "d").await.is_err());
    }
}
