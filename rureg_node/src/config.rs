//! Configuration for rureg node

use ::std::num::{NonZeroU64, NonZeroUsize};

use ::serde::Deserialize;

/// Dataset the node trains on when no other url is configured.
pub static DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/FrowsyFrog/T4_ProgramacionConcurrentDistribuida/main/train.csv";

/// Configuration for rureg node
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// Address the node listens on, e.g. `0.0.0.0:8000`.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Url of the csv training dataset, fetched once at startup.
    #[serde(default = "default_dataset_url")]
    pub dataset_url: String,
    /// An idle connection is closed after this many milliseconds without a frame.
    #[serde(default = "default_read_timeout_millis")]
    pub read_timeout_millis: NonZeroU64,
    /// Connections served at the same time.
    #[serde(default = "default_max_connections")]
    pub max_connections: NonZeroUsize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            dataset_url: default_dataset_url(),
            read_timeout_millis: default_read_timeout_millis(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_listen_address() -> String {
    "0.0.0.0:8000".to_owned()
}

fn default_dataset_url() -> String {
    DEFAULT_DATASET_URL.to_owned()
}

fn default_read_timeout_millis() -> NonZeroU64 {
    NonZeroU64::MIN.saturating_add(59_999)
}

fn default_max_connections() -> NonZeroUsize {
    NonZeroUsize::MIN.saturating_add(1023)
}
