//! Configuration for rureg gateway

use ::std::num::NonZeroU64;

use ::serde::Deserialize;

use crate::pool::Endpoint;

/// Configuration for rureg gateway
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address the HTTP server listens on, e.g. `0.0.0.0:9000`
    pub listen_address: String,
    /// Nodes in round-robin order. Must not be empty.
    pub nodes: Vec<Endpoint>,
    pub connect_timeout_millis: NonZeroU64,
    /// Time to wait for a node's reply once the request is sent
    pub read_timeout_millis: NonZeroU64,
    /// Deadline of the whole round trip to a node
    pub request_timeout_millis: NonZeroU64,
}
