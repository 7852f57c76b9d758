//! Application layer for greenlight-host.
//!
//! - [`provider`]     – the `ConsoleProvider` port and its errors.
//! - [`host_service`] – turns request frames into reply frames.

pub mod host_service;
pub mod provider;

pub use host_service::{HostService, UNSUPPORTED_REQUEST};
pub use provider::{ConsoleProvider, ProviderError};
