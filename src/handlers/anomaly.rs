//! Object-storage batch ingestion path.
//!
//! An anomaly-detection pipeline drops newline-delimited JSON files into a
//! bucket; each storage-change record points at one file. The first object
//! carrying a `diagnostics` array supplies the machine identifier, and the
//! last object in the file (the most recent reading) is the one processed.
//! One malformed record must not block the rest of the batch, so per-record
//! failures are logged and processing continues.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{HandlerError, IntegrationsHandler};
use crate::model::{Area, HierarchyRecord, NodeKind};
use crate::publisher::{IssueDraft, IssueMessage, IssueSource};

/// Storage-change notification batch.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEventBatch {
    #[serde(rename = "Records")]
    pub records: Vec<StorageRecord>,
}

/// One storage-change record.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageRecord {
    #[serde(rename = "eventSource", default)]
    pub event_source: String,
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    #[serde(default)]
    pub s3: Option<S3Entity>,
}

/// Bucket and object references within a record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Entity {
    #[serde(default)]
    pub bucket: S3Bucket,
    #[serde(default)]
    pub object: S3Object,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Bucket {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Object {
    #[serde(default)]
    pub key: String,
}

impl IntegrationsHandler {
    pub(crate) async fn handle_storage_batch(&self, batch: StorageEventBatch) {
        let total = batch.records.len();
        let mut processed = 0usize;

        for (index, record) in batch.records.into_iter().enumerate() {
            info!(
                "Processing record #{} of {} total record(s)",
                index + 1,
                total
            );

            match self.process_storage_record(record).await {
                Ok(()) => processed += 1,
                Err(err) => error!(error = %err, "Unable to process record"),
            }
        }

        if processed == total {
            info!("Successfully processed all record(s)");
        } else {
            warn!(
                "{} record(s) were not successfully processed",
                total - processed
            );
        }
    }

    async fn process_storage_record(&self, record: StorageRecord) -> Result<(), HandlerError> {
        if record.event_source != "aws:s3" || !record.event_name.starts_with("ObjectCreated:") {
            return Ok(());
        }

        let s3 = record.s3.ok_or_else(|| {
            HandlerError::InvalidInput("record did not include object details".to_string())
        })?;
        // Object keys arrive URL-encoded with '+' for spaces.
        let key = urlencoding::decode(&s3.object.key.replace('+', " "))
            .map_err(|e| HandlerError::InvalidInput(format!("object key was not UTF-8: {}", e)))?
            .into_owned();

        let body = self.objects.fetch(&s3.bucket.name, &key).await?;
        let text = String::from_utf8(body).map_err(|_| {
            HandlerError::InvalidInput("object body was not valid UTF-8".to_string())
        })?;

        // The file may carry several JSON objects, one per line.
        let objects = text
            .trim()
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<Vec<Value>, _>>()?;

        let Some(diagnostic) = objects.iter().find(|o| o.get("diagnostics").is_some()) else {
            info!("Skipping record as none of the objects had any diagnostic information");
            return Ok(());
        };

        // Diagnostic names are formatted `machine-id\sensor-id`.
        let machine_id = diagnostic
            .get("diagnostics")
            .and_then(|d| d.get(0))
            .and_then(|d| d.get("name"))
            .and_then(Value::as_str)
            .and_then(|name| name.split('\\').next())
            .unwrap_or_default()
            .to_string();
        debug!(machine_id = %machine_id, "Extracted machine identifier from diagnostics");

        let Some(latest) = objects.last() else {
            return Ok(());
        };

        self.process_anomaly(&machine_id, latest).await
    }

    async fn process_anomaly(&self, machine_id: &str, data: &Value) -> Result<(), HandlerError> {
        if machine_id.trim().is_empty() {
            return Err(HandlerError::MissingMachineId);
        }

        let prediction = data.get("prediction").ok_or(HandlerError::MissingPrediction)?;
        if prediction.as_f64() == Some(0.0) {
            info!("No anomaly detected");
        }

        if data.get("diagnostics").is_none() {
            return Err(HandlerError::MissingDiagnostics);
        }

        info!(machine_id = %machine_id, "Looking up device for machine");
        let device = self.resolver.resolve_device(machine_id).await?;
        let chain = self.walker.device_chain(&device).await?;

        let processes: Vec<_> = self
            .hierarchy
            .query_by_parent(NodeKind::Process, &chain.area.id)
            .await?
            .into_iter()
            .filter_map(HierarchyRecord::into_process)
            .collect();
        if processes.is_empty() {
            return Err(HandlerError::NoProcesses(area_label(&chain.area)));
        }

        let mut events = Vec::new();
        for process in &processes {
            events.extend(
                self.hierarchy
                    .query_by_parent(NodeKind::Event, &process.id)
                    .await?
                    .into_iter()
                    .filter_map(HierarchyRecord::into_event),
            );
        }

        let automated = events
            .into_iter()
            .find(|e| e.is_automated())
            .ok_or_else(|| HandlerError::NoAutomatedEvents(area_label(&chain.area)))?;

        if self
            .issues
            .has_unresolved_issue(&automated.id, &device.name)
            .await?
        {
            return Err(HandlerError::UnresolvedIssueExists);
        }

        let process_name = processes
            .iter()
            .find(|p| p.id == automated.parent_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| crate::walker::WalkError::MissingNode {
                kind: NodeKind::Process,
                id: automated.parent_id.clone(),
            })?;

        let issue = IssueMessage::open(IssueDraft {
            event_id: automated.id,
            event_description: automated.name,
            priority: automated.priority,
            device_name: device.name,
            station_name: chain.station.name,
            area_name: chain.area.name,
            site_name: chain.site.name,
            process_name,
            source: IssueSource::S3File,
            additional_details: Some(serde_json::to_string(data)?),
        });

        self.publisher.publish(&issue).await?;

        Ok(())
    }
}

fn area_label(area: &Area) -> String {
    match &area.description {
        Some(description) => format!("{}: {}", area.name, description),
        None => area.name.clone(),
    }
}
