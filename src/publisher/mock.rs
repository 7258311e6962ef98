//! Mock issue publisher for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{IssueMessage, IssuePublisher, PublishError, Result};

/// Mock publisher capturing published issues.
#[derive(Default)]
pub struct MockIssuePublisher {
    published: RwLock<Vec<IssueMessage>>,
    fail_on_publish: RwLock<bool>,
}

impl MockIssuePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_publish(&self, fail: bool) {
        *self.fail_on_publish.write().await = fail;
    }

    pub async fn published_count(&self) -> usize {
        self.published.read().await.len()
    }

    pub async fn published(&self) -> Vec<IssueMessage> {
        self.published.read().await.clone()
    }

    pub async fn take_published(&self) -> Vec<IssueMessage> {
        std::mem::take(&mut *self.published.write().await)
    }
}

#[async_trait]
impl IssuePublisher for MockIssuePublisher {
    async fn publish(&self, issue: &IssueMessage) -> Result<()> {
        if *self.fail_on_publish.read().await {
            return Err(PublishError::Publish("mock publish failure".to_string()));
        }
        self.published.write().await.push(issue.clone());
        Ok(())
    }
}
