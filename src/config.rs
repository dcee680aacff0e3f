//! Client and table configuration.

use crate::{admin::create_table::Throughput, common::key::KeyDefinition};

use aws_sdk_dynamodb::Client;
use std::{env, time::Duration};

/// Region used when `AWS_REGION` is not set.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Table name used when none is configured.
pub const DEFAULT_TABLE_NAME: &str = "Test";

/// Where the store lives.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    /// Custom endpoint URL (for DynamoDB Local).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint_url: env::var("AWS_ENDPOINT_URL").ok(),
            region: env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
        }
    }
}

impl StoreConfig {
    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("local DynamoDB ({url})"),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client with the given configuration.
///
/// Credentials come from the default provider chain.
pub async fn create_client(config: &StoreConfig) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));
    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    let sdk_config = loader.load().await;
    Client::new(&sdk_config)
}

/// Shape and provisioning of the backing table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableConfig {
    /// How often to poll a freshly created table for activation.
    pub activation_poll_interval: Duration,
    /// How long to wait for a freshly created table to become active.
    pub activation_timeout: Duration,
    /// Whether reads are strongly consistent, so a read observes every write
    /// acknowledged before it.
    pub consistent_read: bool,
    /// The partition key attribute.
    pub partition_key: KeyDefinition,
    /// The optional sort key attribute.
    pub sort_key: Option<KeyDefinition>,
    /// The table name.
    pub table_name: String,
    /// Provisioned capacity; `None` selects on-demand billing.
    pub throughput: Option<Throughput>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            activation_poll_interval: Duration::from_millis(500),
            activation_timeout: Duration::from_secs(60),
            consistent_read: true,
            partition_key: KeyDefinition::string("id"),
            sort_key: None,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            throughput: Some(Throughput::default()),
        }
    }
}

impl TableConfig {
    /// Default configuration for the named table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }
}
