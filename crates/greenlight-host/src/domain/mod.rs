//! Domain layer for greenlight-host: configuration only.

pub mod config;

pub use config::{HostConfig, DEFAULT_PORT};
