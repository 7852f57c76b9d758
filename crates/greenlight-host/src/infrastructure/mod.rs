//! Infrastructure layer for greenlight-host.
//!
//! - [`inventory`] – TOML console inventory and the provider serving it.
//! - [`ws_server`] – WebSocket accept loop.

pub mod inventory;
pub mod ws_server;

pub use inventory::{load_inventory, ConfigError, InventoryProvider};
pub use ws_server::{run_server, serve};
