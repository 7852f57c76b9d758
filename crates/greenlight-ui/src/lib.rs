//! greenlight-ui library crate.
//!
//! The UI side of the Greenlight `stream` channel: it asks the host for the
//! console list, keeps the last accepted list, and starts stream sessions.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! greenlight-host (JSON frames over WebSocket or an in-process channel)
//!         ↕
//! [greenlight-ui]
//!   ├── domain/           ConsoleListState, UiConfig
//!   ├── application/      registry, issuer, router, bus, scope
//!   └── infrastructure/
//!         ├── transport/  in-process duplex + WebSocket client
//!         └── ui_bridge/  view DTOs and the text renderer
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain`, `greenlight-core`, and the
//!   `ChannelTransport` port it defines; it never names a concrete transport.
//! - `infrastructure` implements the port and depends on everything else.
//!
//! # Typical use
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use greenlight_core::RoutingPolicy;
//! use greenlight_ui::application::{ConsoleBus, ConsoleListScope, TracingPresenter};
//! use greenlight_ui::infrastructure::transport::WsTransport;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let (transport, inbound) = WsTransport::connect("ws://127.0.0.1:24900", 64).await?;
//! let (bus, _pump) = ConsoleBus::start(Arc::new(transport), inbound, RoutingPolicy::Strict);
//! let mut scope = ConsoleListScope::mount(&bus, Arc::new(TracingPresenter)).await?;
//! scope.wait_settled(Duration::from_secs(10)).await?;
//! println!("{} console(s)", scope.consoles().len());
//! # Ok(())
//! # }
//! ```

/// Domain layer: console list state and configuration (no I/O).
pub mod domain;

/// Application layer: dispatch, request/response cycles, scopes.
pub mod application;

/// Infrastructure layer: transports and presentation helpers.
pub mod infrastructure;
