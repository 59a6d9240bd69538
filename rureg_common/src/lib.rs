//! Common types and utilities for the rureg services.

pub mod codec;
pub mod config;
pub mod error;

pub use ::anyhow;
pub use ::serde;
pub use ::serde_json;
pub use ::tokio;
pub use ::tracing;
pub use ::tracing_subscriber;
