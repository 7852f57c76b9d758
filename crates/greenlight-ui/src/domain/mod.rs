//! Domain layer for greenlight-ui.
//!
//! Pure state with no I/O: the console list a mounted scope renders from,
//! and the configuration struct.

pub mod config;
pub mod console_list;

pub use config::UiConfig;
pub use console_list::ConsoleListState;
