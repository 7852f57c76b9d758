//! Channel transport implementations.

pub mod memory;
pub mod websocket;

pub use memory::{duplex, HostEnd, MemoryTransport};
pub use websocket::WsTransport;
