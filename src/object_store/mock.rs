//! Mock object fetcher for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{FetchError, ObjectFetcher, Result};

/// Mock object fetcher holding bodies in memory.
#[derive(Default)]
pub struct MockObjectFetcher {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
    fail_on_fetch: RwLock<bool>,
}

impl MockObjectFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, bucket: impl Into<String>, key: impl Into<String>, body: Vec<u8>) {
        self.objects
            .write()
            .await
            .insert((bucket.into(), key.into()), body);
    }

    pub async fn set_fail_on_fetch(&self, fail: bool) {
        *self.fail_on_fetch.write().await = fail;
    }
}

#[async_trait]
impl ObjectFetcher for MockObjectFetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        if *self.fail_on_fetch.read().await {
            return Err(FetchError::Download("mock fetch failure".to_string()));
        }
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}
