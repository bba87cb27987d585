use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Stream carrying inbound raw sensor records. Required, no default.
    pub raw_stream: String,

    /// Stream carrying outbound processed records. Required, no default.
    pub processed_stream: String,

    /// Batch size for consumers
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Max wait time for batches in seconds
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// Startup timeout for initialization operations in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    // CSV producer configuration
    /// Replay a CSV sensor export onto the raw stream
    #[serde(default = "default_enable_csv_producer")]
    pub enable_csv_producer: bool,

    /// Path to the CSV sensor export
    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    /// Delay between published rows in milliseconds
    #[serde(default = "default_publish_delay_ms")]
    pub publish_delay_ms: u64,

    // Record viewer configuration
    /// Tail the processed stream and log finished records
    #[serde(default = "default_enable_record_viewer")]
    pub enable_record_viewer: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

// NATS defaults
fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_nats_batch_size() -> usize {
    30
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_startup_timeout_secs() -> u64 {
    30
}

// CSV producer defaults
fn default_enable_csv_producer() -> bool {
    false
}

fn default_csv_path() -> String {
    "Labels.csv".to_string()
}

fn default_publish_delay_ms() -> u64 {
    100
}

// Record viewer defaults
fn default_enable_record_viewer() -> bool {
    false
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("PIPELINE"))
            .build()?
            .try_deserialize()
    }

    /// Subject filter matching everything producers publish on a stream.
    pub fn subject_filter(stream: &str) -> String {
        format!("{}.*", stream)
    }
}
