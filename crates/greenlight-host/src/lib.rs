//! greenlight-host library crate.
//!
//! The host side of the Greenlight `stream` channel.  It answers
//! `get_consoles` with the consoles a [`application::ConsoleProvider`] knows
//! about and `start_stream` with a session id.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! greenlight-ui (JSON frames over WebSocket or an in-process channel)
//!         ↕
//! [greenlight-host]
//!   ├── domain/           HostConfig
//!   ├── application/      ConsoleProvider port, HostService
//!   └── infrastructure/
//!         ├── inventory/  TOML inventory + InventoryProvider
//!         └── ws_server/  WebSocket accept loop (tokio-tungstenite)
//! ```
//!
//! `HostService` never sees a socket: it maps one frame to at most one
//! reply, so the same service answers WebSocket sessions and in-process
//! channels alike.

/// Domain layer: configuration (no I/O).
pub mod domain;

/// Application layer: request handling.
pub mod application;

/// Infrastructure layer: inventory file and WebSocket server.
pub mod infrastructure;
