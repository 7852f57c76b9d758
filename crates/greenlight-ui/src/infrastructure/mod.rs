//! Infrastructure layer for greenlight-ui.
//!
//! - [`transport`] – in-process and WebSocket implementations of
//!   `ChannelTransport`.
//! - [`ui_bridge`] – view-ready DTOs and the plain-text console list.

pub mod transport;
pub mod ui_bridge;
