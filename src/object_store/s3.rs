//! Amazon S3 object fetcher.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use tracing::debug;

use super::{FetchError, ObjectFetcher, Result};

/// S3-backed object fetcher.
///
/// Uses default credentials from the environment (AWS_ACCESS_KEY_ID,
/// AWS_SECRET_ACCESS_KEY, or IAM role).
pub struct S3ObjectFetcher {
    client: Client,
}

impl S3ObjectFetcher {
    /// Create a new S3 object fetcher.
    pub async fn new(endpoint_url: Option<&str>, region: Option<&str>) -> Result<Self> {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = region {
            config_loader = config_loader.region(aws_config::Region::new(region.to_string()));
        }

        let config = config_loader.load().await;

        let client = if let Some(endpoint) = endpoint_url {
            let s3_config = aws_sdk_s3::config::Builder::from(&config)
                .endpoint_url(endpoint)
                .force_path_style(true) // Required for MinIO and most S3-compatible services
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(&config)
        };

        Ok(Self { client })
    }

    /// Create with explicit client (for testing).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectFetcher for S3ObjectFetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        debug!(bucket = %bucket, key = %key, "Getting object from S3");

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("NoSuchKey") || err_str.contains("404") {
                    FetchError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    FetchError::Download(format!("{}", e))
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| FetchError::Body(format!("{}", e)))?
            .into_bytes()
            .to_vec();

        debug!(bucket = %bucket, key = %key, size = body.len(), "Fetched object");

        Ok(body)
    }
}
