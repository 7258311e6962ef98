//! DynamoDB store implementations.
//!
//! Hierarchy table schema:
//! - PK: `id` (String), SK: `type` (String discriminant)
//! - GSI `ByTypeAndParent-index`: hash `type`, range `parentId`
//!
//! Issues table schema (queried only, never written):
//! - GSI `ByDeviceEvent-index`: hash `deviceName#eventId`
//!
//! Queries follow `LastEvaluatedKey` continuation tokens until all pages are
//! exhausted; the dedup gate short-circuits on the first hit.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

use crate::model::{Area, Device, Event, HierarchyRecord, NodeKind, Process, Site, Station};
use crate::store::{HierarchyStore, IssueStore, Result, StoreError};

/// GSI over the hierarchy table keyed by type discriminant and parent id.
const BY_TYPE_AND_PARENT_INDEX: &str = "ByTypeAndParent-index";

/// GSI over the issues table keyed by the device+event composite.
const BY_DEVICE_EVENT_INDEX: &str = "ByDeviceEvent-index";

/// Composite hash-key attribute on the issues table GSI.
const DEVICE_EVENT_KEY: &str = "deviceName#eventId";

type Item = HashMap<String, AttributeValue>;

/// DynamoDB implementation of `HierarchyStore`.
pub struct DynamoHierarchyStore {
    client: Client,
    table_name: String,
}

impl DynamoHierarchyStore {
    /// Create a new DynamoDB hierarchy store.
    pub async fn new(table_name: impl Into<String>, endpoint_url: Option<&str>) -> Result<Self> {
        let client = make_client(endpoint_url).await;
        let table_name = table_name.into();
        info!(table = %table_name, "Connected to DynamoDB for the data hierarchy");

        Ok(Self { client, table_name })
    }

    /// Create with explicit client (for testing against LocalStack).
    pub fn with_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    async fn query_paged(
        &self,
        key_condition: &str,
        filter: Option<&str>,
        names: &[(&str, &str)],
        values: Vec<(&str, AttributeValue)>,
    ) -> Result<Vec<HierarchyRecord>> {
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(BY_TYPE_AND_PARENT_INDEX)
                .key_condition_expression(key_condition);

            if let Some(filter) = filter {
                request = request.filter_expression(filter);
            }
            for (placeholder, attr) in names {
                request = request.expression_attribute_names(*placeholder, *attr);
            }
            for (placeholder, value) in &values {
                request = request.expression_attribute_values(*placeholder, value.clone());
            }
            if let Some(key) = start_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let response = request
                .send()
                .await
                .map_err(|e| StoreError::Query(format!("{}", e)))?;

            debug!(
                table = %self.table_name,
                count = response.items().len(),
                "Query page returned"
            );

            for item in response.items() {
                records.push(decode_record(item)?);
            }

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl HierarchyStore for DynamoHierarchyStore {
    async fn get_by_id(&self, id: &str, kind: NodeKind) -> Result<Option<HierarchyRecord>> {
        debug!(id = %id, kind = %kind, "Getting hierarchy item by id");

        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .key("type", AttributeValue::S(kind.discriminant().to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Get(format!("{}", e)))?;

        match response.item() {
            Some(item) => Ok(Some(decode_record(item)?)),
            None => Ok(None),
        }
    }

    async fn query_by_parent(
        &self,
        kind: NodeKind,
        parent_id: &str,
    ) -> Result<Vec<HierarchyRecord>> {
        debug!(kind = %kind, parent_id = %parent_id, "Querying hierarchy items by parent");

        self.query_paged(
            "#type = :type and #parentId = :parentId",
            None,
            &[("#type", "type"), ("#parentId", "parentId")],
            vec![
                (":type", AttributeValue::S(kind.discriminant().to_string())),
                (":parentId", AttributeValue::S(parent_id.to_string())),
            ],
        )
        .await
    }

    async fn query_by_alias(&self, kind: NodeKind, alias: &str) -> Result<Vec<HierarchyRecord>> {
        debug!(kind = %kind, alias = %alias, "Querying hierarchy items by alias");

        self.query_paged(
            "#type = :type",
            Some("#alias = :alias"),
            &[("#type", "type"), ("#alias", "alias")],
            vec![
                (":type", AttributeValue::S(kind.discriminant().to_string())),
                (":alias", AttributeValue::S(alias.to_string())),
            ],
        )
        .await
    }
}

/// DynamoDB implementation of `IssueStore`.
pub struct DynamoIssueStore {
    client: Client,
    table_name: String,
}

impl DynamoIssueStore {
    /// Create a new DynamoDB issue store.
    pub async fn new(table_name: impl Into<String>, endpoint_url: Option<&str>) -> Result<Self> {
        let client = make_client(endpoint_url).await;
        let table_name = table_name.into();
        info!(table = %table_name, "Connected to DynamoDB for issues");

        Ok(Self { client, table_name })
    }

    /// Create with explicit client (for testing against LocalStack).
    pub fn with_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl IssueStore for DynamoIssueStore {
    async fn has_unresolved_issue(&self, event_id: &str, device_name: &str) -> Result<bool> {
        let hash_key = format!("{}#{}", device_name, event_id);
        let mut start_key: Option<Item> = None;

        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(BY_DEVICE_EVENT_INDEX)
                .key_condition_expression("#hashKey = :hashKey")
                .filter_expression("attribute_not_exists(#closed)")
                .expression_attribute_names("#hashKey", DEVICE_EVENT_KEY)
                .expression_attribute_names("#closed", "closed")
                .expression_attribute_values(":hashKey", AttributeValue::S(hash_key.clone()));

            if let Some(key) = start_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let response = request
                .send()
                .await
                .map_err(|e| StoreError::Query(format!("{}", e)))?;

            if !response.items().is_empty() {
                debug!(
                    event_id = %event_id,
                    device_name = %device_name,
                    "Found an unresolved issue"
                );
                return Ok(true);
            }

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => return Ok(false),
            }
        }
    }
}

async fn make_client(endpoint_url: Option<&str>) -> Client {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    if let Some(endpoint) = endpoint_url {
        let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&config)
            .endpoint_url(endpoint)
            .build();
        Client::from_conf(dynamo_config)
    } else {
        Client::new(&config)
    }
}

fn str_attr<'a>(item: &'a Item, name: &str) -> Option<&'a str> {
    match item.get(name) {
        Some(AttributeValue::S(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn required_attr<'a>(item: &'a Item, name: &str) -> Result<&'a str> {
    str_attr(item, name)
        .ok_or_else(|| StoreError::Malformed(format!("missing string attribute '{}'", name)))
}

/// Decode a single-table item into its tagged variant.
fn decode_record(item: &Item) -> Result<HierarchyRecord> {
    let id = required_attr(item, "id")?.to_string();
    let name = required_attr(item, "name")?.to_string();
    let kind = required_attr(item, "type")?;

    let record = match kind {
        "SITE" => HierarchyRecord::Site(Site { id, name }),
        "AREA" => HierarchyRecord::Area(Area {
            id,
            name,
            parent_id: required_attr(item, "parentId")?.to_string(),
            description: str_attr(item, "description").map(str::to_string),
        }),
        "PROCESS" => HierarchyRecord::Process(Process {
            id,
            name,
            parent_id: required_attr(item, "parentId")?.to_string(),
        }),
        "STATION" => HierarchyRecord::Station(Station {
            id,
            name,
            parent_id: required_attr(item, "parentId")?.to_string(),
        }),
        "DEVICE" => HierarchyRecord::Device(Device {
            id,
            name,
            parent_id: required_attr(item, "parentId")?.to_string(),
            alias: str_attr(item, "alias").map(str::to_string),
        }),
        "EVENT" => HierarchyRecord::Event(Event {
            id,
            name,
            parent_id: required_attr(item, "parentId")?.to_string(),
            priority: required_attr(item, "priority")?.to_string(),
            event_type: str_attr(item, "eventType").map(str::to_string),
            alias: str_attr(item, "alias").map(str::to_string),
        }),
        other => {
            return Err(StoreError::Malformed(format!(
                "unknown hierarchy type '{}'",
                other
            )))
        }
    };

    Ok(record)
}
