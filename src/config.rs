//! Application configuration.
//!
//! Loaded from environment variables: the integrations process runs inside a
//! managed invocation environment, so there is no configuration file layer.

use serde::Deserialize;

/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "ANDON_LOG";
/// Environment variable for the data hierarchy table name.
pub const DATA_HIERARCHY_TABLE_ENV_VAR: &str = "DATA_HIERARCHY_TABLE";
/// Environment variable for the issues table name.
pub const ISSUES_TABLE_ENV_VAR: &str = "ISSUES_TABLE";
/// Environment variable for the issues topic.
pub const ISSUES_TOPIC_ENV_VAR: &str = "ISSUES_TOPIC";
/// Environment variable for the IoT data endpoint address.
pub const IOT_ENDPOINT_ADDRESS_ENV_VAR: &str = "IOT_ENDPOINT_ADDRESS";
/// Environment variable for the telemetry message name delimiter.
pub const IOT_MESSAGE_NAME_DELIMITER_ENV_VAR: &str = "IOT_MESSAGE_NAME_DELIMITER";
/// Environment variable for a custom AWS endpoint (LocalStack or testing).
pub const AWS_ENDPOINT_URL_ENV_VAR: &str = "AWS_ENDPOINT_URL";
/// Environment variable for the AWS region.
pub const AWS_REGION_ENV_VAR: &str = "AWS_REGION";

fn default_delimiter() -> String {
    "/".to_string()
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name of the denormalized Site/Area/Process/Station/Device/Event table.
    pub data_hierarchy_table: String,
    /// Name of the issues table (dedup gate queries only).
    pub issues_table: String,
    /// Topic the normalized issue payload is published to.
    pub issues_topic: String,
    /// IoT data-plane endpoint address for publishing.
    pub iot_endpoint_address: String,
    /// Delimiter splitting telemetry message names into machine name and tag.
    pub iot_message_name_delimiter: String,
    /// Custom AWS endpoint URL (LocalStack or testing).
    pub aws_endpoint_url: Option<String>,
    /// AWS region. Uses the default provider chain if not set.
    pub aws_region: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_hierarchy_table: String::new(),
            issues_table: String::new(),
            issues_topic: String::new(),
            iot_endpoint_address: String::new(),
            iot_message_name_delimiter: default_delimiter(),
            aws_endpoint_url: None,
            aws_region: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Environment variable names map to field names uppercased, e.g.
    /// `DATA_HIERARCHY_TABLE` -> `data_hierarchy_table`.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config = ::config::Config::builder()
            .add_source(::config::Environment::default())
            .build()?;

        config.try_deserialize()
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self {
            data_hierarchy_table: "test-hierarchy".to_string(),
            issues_table: "test-issues".to_string(),
            issues_topic: "andon/issues".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_delimiter() {
        let config = AppConfig::default();
        assert_eq!(config.iot_message_name_delimiter, "/");
        assert!(config.aws_endpoint_url.is_none());
    }

    #[test]
    fn test_config_for_test() {
        let config = AppConfig::for_test();
        assert_eq!(config.data_hierarchy_table, "test-hierarchy");
        assert_eq!(config.issues_topic, "andon/issues");
    }
}
