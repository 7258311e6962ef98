//! Object storage access for anomaly-detection output.
//!
//! The batch ingestion path fetches newline-delimited JSON files that an
//! anomaly-detection pipeline drops into a bucket. Only reads are needed.

use async_trait::async_trait;
use thiserror::Error;

pub mod mock;
pub mod s3;

pub use mock::MockObjectFetcher;
pub use s3::S3ObjectFetcher;

/// Result type for object store operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while fetching an object.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("S3 download failed: {0}")]
    Download(String),

    #[error("S3 body read failed: {0}")]
    Body(String),
}

/// Fetches object bodies by bucket and key.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}
