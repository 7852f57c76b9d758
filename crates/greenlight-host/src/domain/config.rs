//! Host configuration types.
//!
//! [`HostConfig`] is populated from CLI arguments in `main.rs`.  Keeping it a
//! plain struct means tests can build one without touching the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

/// All runtime configuration for the host process.
///
/// ```rust
/// use greenlight_host::domain::HostConfig;
///
/// let cfg = HostConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 24900);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Address the WebSocket server listens on.
    ///
    /// Loopback by default: the UI normally runs on the same machine.
    pub bind_addr: SocketAddr,

    /// TOML file listing the consoles to serve.  `None` serves an empty list.
    pub inventory_path: Option<PathBuf>,
}

/// Default WebSocket port.
pub const DEFAULT_PORT: u16 = 24900;

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            inventory_path: None,
        }
    }
}
