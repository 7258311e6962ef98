//! Telemetry ingestion path.
//!
//! A machine publishes `{name, value, timestamp, quality}` messages to the
//! devices topic. The message name splits into a machine name and a trailing
//! tag name on the configured delimiter; `{tag}_{value}` keys the event
//! lookup. All failures on this path abort the invocation: with a single
//! message per invocation there is nothing else to salvage.

use serde::Deserialize;
use tracing::{debug, info};

use super::{HandlerError, IntegrationsHandler};
use crate::publisher::{IssueDraft, IssueMessage, IssueSource};

/// Telemetry batch published to the devices topic.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryBatch {
    pub messages: Vec<TelemetryMessage>,
}

/// A single telemetry reading. Fields are optional so that presence can be
/// validated with a precise per-field error.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryMessage {
    pub name: Option<String>,
    pub value: Option<String>,
    pub timestamp: Option<String>,
    pub quality: Option<String>,
}

impl IntegrationsHandler {
    pub(crate) async fn handle_telemetry(
        &self,
        mut batch: TelemetryBatch,
    ) -> Result<(), HandlerError> {
        info!("Handling message posted to the devices topic");

        // Only the most recent message in the batch is acted on; earlier
        // entries are dropped.
        let msg = batch.messages.pop().ok_or_else(|| {
            HandlerError::InvalidInput("event did not include an array of messages".to_string())
        })?;

        let name = required_field(&msg.name, "name")?;
        let value = required_field(&msg.value, "value")?;
        required_field(&msg.timestamp, "timestamp")?;

        let (machine_name, tag_name) = name
            .rsplit_once(self.name_delimiter.as_str())
            .ok_or_else(|| HandlerError::UnsplittableName(self.name_delimiter.clone()))?;
        debug!(
            tag = tag_name,
            machine = machine_name,
            "Derived tag name and machine name from the message"
        );

        let device = self.resolver.resolve_device(machine_name).await?;
        let event = self
            .resolver
            .resolve_event(&format!("{}_{}", tag_name, value))
            .await?;

        if self
            .issues
            .has_unresolved_issue(&event.id, &device.name)
            .await?
        {
            return Err(HandlerError::UnresolvedIssueExists);
        }

        let chain = self.walker.full_chain(&device, &event).await?;

        let issue = IssueMessage::open(IssueDraft {
            event_id: event.id,
            event_description: event.name,
            priority: event.priority,
            device_name: device.name,
            station_name: chain.station.name,
            area_name: chain.area.name,
            site_name: chain.site.name,
            process_name: chain.process.name,
            source: IssueSource::Device,
            additional_details: None,
        });

        self.publisher.publish(&issue).await?;

        Ok(())
    }
}

fn required_field<'a>(
    field: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, HandlerError> {
    field
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(HandlerError::MissingMessageField(name))
}
