//! Issue publishing.
//!
//! Builds the normalized issue payload and publishes it as a single message
//! to the configured issues topic. No acknowledgment or retry happens at this
//! layer; publish failures propagate to the caller.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub mod iot;
pub mod mock;

pub use iot::IotIssuePublisher;
pub use mock::MockIssuePublisher;

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;

/// Errors that can occur while publishing an issue.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to publish issue: {0}")]
    Publish(String),

    #[error("Failed to serialize issue payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where an issue originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSource {
    /// A telemetry message published by the machine itself.
    Device,
    /// An anomaly-detection file landing in object storage.
    S3File,
}

impl IssueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSource::Device => "device",
            IssueSource::S3File => "s3File",
        }
    }

    /// The `createdBy` attribution paired with this source.
    pub fn created_by(&self) -> &'static str {
        match self {
            IssueSource::Device => "device",
            IssueSource::S3File => "automatic-issue-detection",
        }
    }
}

/// Resolved incident properties, before normalization into an `IssueMessage`.
#[derive(Debug, Clone)]
pub struct IssueDraft {
    pub event_id: String,
    pub event_description: String,
    pub priority: String,
    pub device_name: String,
    pub station_name: String,
    pub area_name: String,
    pub site_name: String,
    pub process_name: String,
    pub source: IssueSource,
    pub additional_details: Option<String>,
}

/// The normalized issue payload published to the issues topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueMessage {
    pub id: String,
    pub event_id: String,
    pub event_description: String,
    pub priority: String,
    pub device_name: String,
    pub station_name: String,
    pub area_name: String,
    pub site_name: String,
    pub process_name: String,
    pub status: String,
    pub created: String,
    pub issue_source: String,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
}

impl IssueMessage {
    /// Build an open issue from a resolved incident: fresh id, `status: open`,
    /// `created` set to now.
    pub fn open(draft: IssueDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: draft.event_id,
            event_description: draft.event_description,
            priority: draft.priority,
            device_name: draft.device_name,
            station_name: draft.station_name,
            area_name: draft.area_name,
            site_name: draft.site_name,
            process_name: draft.process_name,
            status: "open".to_string(),
            created: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            issue_source: draft.source.as_str().to_string(),
            created_by: draft.source.created_by().to_string(),
            additional_details: draft.additional_details,
        }
    }
}

/// Publishes normalized issues to the issues topic.
#[async_trait]
pub trait IssuePublisher: Send + Sync {
    async fn publish(&self, issue: &IssueMessage) -> Result<()>;
}
