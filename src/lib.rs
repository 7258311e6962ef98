//! External-integrations event resolver for factory-floor Andon issue tracking.
//!
//! Ingests raw machine signals (telemetry messages published to an IoT topic,
//! or batches of anomaly-detection records landing in S3), resolves them
//! against the denormalized data hierarchy (Site → Area → Process/Station →
//! Device/Event), deduplicates against still-open issues, and publishes a
//! normalized "open issue" event to the issues topic.
//!
//! ## Pipeline
//! ```text
//! [IoT message | S3 records] -> [IntegrationsHandler]
//!     -> [IdentityResolver]   (machine id/alias -> Device, tag_value -> Event)
//!     -> [HierarchyWalker]    (parentId walk: Station -> Area -> Site, Process)
//!     -> [IssueStore]         (open-issue dedup gate)
//!     -> [IssuePublisher]     (normalized issue on the issues topic)
//! ```
//!
//! All collaborators are trait objects injected at construction, so the
//! pipeline can run against DynamoDB/S3/IoT in production and in-memory
//! mocks in tests.

pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod model;
pub mod object_store;
pub mod publisher;
pub mod resolver;
pub mod store;
pub mod walker;

pub use config::AppConfig;
pub use handlers::{HandlerError, IntegrationsHandler};
