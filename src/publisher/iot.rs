//! AWS IoT data-plane issue publisher.

use async_trait::async_trait;
use aws_sdk_iotdataplane::primitives::Blob;
use aws_sdk_iotdataplane::Client;
use tracing::info;

use super::{IssueMessage, IssuePublisher, PublishError, Result};

/// Publishes issues to an AWS IoT topic via the data-plane API.
pub struct IotIssuePublisher {
    client: Client,
    topic: String,
}

impl IotIssuePublisher {
    /// Create a new IoT issue publisher against the account's data endpoint.
    pub async fn new(
        endpoint_url: &str,
        region: Option<&str>,
        topic: impl Into<String>,
    ) -> Result<Self> {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = region {
            config_loader = config_loader.region(aws_config::Region::new(region.to_string()));
        }

        let config = config_loader.load().await;

        let iot_config = aws_sdk_iotdataplane::config::Builder::from(&config)
            .endpoint_url(endpoint_url)
            .build();
        let client = Client::from_conf(iot_config);

        let topic = topic.into();
        info!(endpoint = %endpoint_url, topic = %topic, "Connected to the IoT data endpoint");

        Ok(Self { client, topic })
    }

    /// Create with explicit client (for testing).
    pub fn with_client(client: Client, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl IssuePublisher for IotIssuePublisher {
    async fn publish(&self, issue: &IssueMessage) -> Result<()> {
        let payload = serde_json::to_vec(issue)?;

        self.client
            .publish()
            .topic(&self.topic)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| PublishError::Publish(format!("{}", e)))?;

        info!(topic = %self.topic, issue = %issue.id, "Published issue to the issues topic");

        Ok(())
    }
}
