//! The Console Provider port.
//!
//! The host does not talk to consoles itself.  Whatever actually knows the
//! consoles (a cloud account, a LAN discovery service, a static inventory)
//! implements [`ConsoleProvider`], and [`crate::application::HostService`]
//! turns its answers into envelopes.

use async_trait::async_trait;
use greenlight_core::{ConsoleId, ConsoleRecord};
use thiserror::Error;

/// Failures a provider can report.  Each maps to an `error` envelope whose
/// `data` carries the [`ProviderError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("not signed in")]
    Unauthorized,

    #[error("console service unavailable: {0}")]
    Unavailable(String),

    #[error("unknown console: {0}")]
    UnknownConsole(ConsoleId),

    #[error("streaming is disabled on console {0}")]
    StreamingDisabled(ConsoleId),
}

impl ProviderError {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::Unauthorized => "unauthorized",
            ProviderError::Unavailable(_) => "unavailable",
            ProviderError::UnknownConsole(_) => "unknown_console",
            ProviderError::StreamingDisabled(_) => "streaming_disabled",
        }
    }
}

/// Source of console records and stream sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsoleProvider: Send + Sync {
    /// Every console the signed-in account can see, in display order.
    async fn list_consoles(&self) -> Result<Vec<ConsoleRecord>, ProviderError>;

    /// Prepares a streaming session and returns its id.
    async fn start_stream(&self, console_id: &ConsoleId) -> Result<String, ProviderError>;
}
