//! UI configuration types.
//!
//! [`UiConfig`] holds every runtime setting of the console list UI.  It is
//! populated from CLI arguments in `main.rs`; the defaults suit a host
//! running on the same machine.

use std::time::Duration;

use greenlight_core::RoutingPolicy;

/// All runtime configuration for the UI side of the channel.
///
/// ```rust
/// use greenlight_ui::domain::UiConfig;
///
/// let cfg = UiConfig::default();
/// assert_eq!(cfg.host_url, "ws://127.0.0.1:24900");
/// ```
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// WebSocket URL of the host process.
    pub host_url: String,

    /// How long a request may stay unanswered before its cycle fails.
    pub request_timeout: Duration,

    /// How inbound envelopes are classified and matched to requests.
    pub routing: RoutingPolicy,

    /// Capacity of the inbound frame queue between transport and pump.
    pub channel_capacity: usize,
}

impl Default for UiConfig {
    /// | Field            | Default                 |
    /// |------------------|-------------------------|
    /// | host_url         | `ws://127.0.0.1:24900`  |
    /// | request_timeout  | 10 seconds              |
    /// | routing          | `Strict`                |
    /// | channel_capacity | 64                      |
    fn default() -> Self {
        Self {
            host_url: "ws://127.0.0.1:24900".to_string(),
            request_timeout: Duration::from_secs(10),
            routing: RoutingPolicy::Strict,
            channel_capacity: 64,
        }
    }
}
