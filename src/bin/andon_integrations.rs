//! andon-integrations: resolves machine telemetry and anomaly-detection
//! output into normalized issue events.
//!
//! Reads one inbound event as JSON from stdin, runs it through the
//! ingestion pipeline, and exits non-zero on failure. The hosting
//! invocation environment owns timeouts and redelivery.
//!
//! ## Configuration
//! - DATA_HIERARCHY_TABLE: denormalized hierarchy table name
//! - ISSUES_TABLE: issues table name (dedup gate)
//! - ISSUES_TOPIC: topic the normalized issue is published to
//! - IOT_ENDPOINT_ADDRESS: IoT data endpoint for publishing
//! - IOT_MESSAGE_NAME_DELIMITER: telemetry name delimiter (default "/")
//! - AWS_ENDPOINT_URL: custom AWS endpoint (LocalStack or testing)
//! - ANDON_LOG: log filter (default "info")

use std::io::Read;
use std::sync::Arc;

use tracing::{error, info};

use andon_integrations::bootstrap;
use andon_integrations::config::AppConfig;
use andon_integrations::handlers::IntegrationsHandler;
use andon_integrations::object_store::S3ObjectFetcher;
use andon_integrations::publisher::IotIssuePublisher;
use andon_integrations::store::{DynamoHierarchyStore, DynamoIssueStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bootstrap::init_tracing();

    let config = AppConfig::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if config.data_hierarchy_table.is_empty() || config.issues_table.is_empty() {
        return Err("DATA_HIERARCHY_TABLE and ISSUES_TABLE must be set".into());
    }
    if config.issues_topic.is_empty() || config.iot_endpoint_address.is_empty() {
        return Err("ISSUES_TOPIC and IOT_ENDPOINT_ADDRESS must be set".into());
    }

    info!("Starting andon-integrations");

    let endpoint = config.aws_endpoint_url.as_deref();
    let region = config.aws_region.as_deref();

    let hierarchy = Arc::new(
        DynamoHierarchyStore::new(&config.data_hierarchy_table, endpoint).await?,
    );
    let issues = Arc::new(DynamoIssueStore::new(&config.issues_table, endpoint).await?);
    let objects = Arc::new(S3ObjectFetcher::new(endpoint, region).await?);
    let publisher = Arc::new(
        IotIssuePublisher::new(&config.iot_endpoint_address, region, &config.issues_topic)
            .await?,
    );

    let handler = IntegrationsHandler::new(
        hierarchy,
        issues,
        objects,
        publisher,
        &config.iot_message_name_delimiter,
    );

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let event: serde_json::Value = serde_json::from_str(&input)?;

    info!("Received event");
    handler.handle(event).await?;

    Ok(())
}
