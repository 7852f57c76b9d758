//! Presentation bridge: turns console records into something a view can show.
//!
//! # Data Transfer Objects (DTOs)
//!
//! [`ConsoleRecord`] mirrors the host's wire shape.  A view wants slightly
//! different things: flags rendered as `Enabled`/`Disabled`, and the stream
//! route already built.  [`ConsoleCardDto`] is that view-ready shape.  It is
//! `Serialize` so a web frontend can take it as JSON unchanged.
//!
//! [`render_console_list`] is the plain-text view used by the `greenlight`
//! binary.

use std::fmt::Write as _;

use greenlight_core::{ConsoleRecord, StreamRoute};
use serde::{Deserialize, Serialize};

/// Page title shown above the console list.
pub const PAGE_TITLE: &str = "Greenlight - My Consoles";

/// One console card, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleCardDto {
    pub name: String,
    pub id: String,
    pub state: String,
    pub console_type: String,
    pub assistant: String,
    pub remote: String,
    pub streaming: String,
    /// Navigation target of the "Start stream" action, e.g. `stream/A1`.
    pub stream_route: String,
}

fn flag(enabled: bool) -> String {
    if enabled { "Enabled" } else { "Disabled" }.to_string()
}

impl From<&ConsoleRecord> for ConsoleCardDto {
    fn from(record: &ConsoleRecord) -> Self {
        Self {
            name: record.name.clone(),
            id: record.id.to_string(),
            state: record.power_state.clone(),
            console_type: record.console_type.clone(),
            assistant: flag(record.digital_assistant_remote_control_enabled),
            remote: flag(record.remote_management_enabled),
            streaming: flag(record.console_streaming_enabled),
            stream_route: StreamRoute::new(record.id.clone()).path(),
        }
    }
}

/// Builds one card per record, in list order.
pub fn console_cards(records: &[ConsoleRecord]) -> Vec<ConsoleCardDto> {
    records.iter().map(ConsoleCardDto::from).collect()
}

/// Renders the console list as plain text.
pub fn render_console_list(records: &[ConsoleRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{PAGE_TITLE}");
    let _ = writeln!(out, "{}", "=".repeat(PAGE_TITLE.len()));
    if records.is_empty() {
        let _ = writeln!(out, "No consoles found");
        return out;
    }
    for card in console_cards(records) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Name: {}", card.name);
        let _ = writeln!(out, "ID: {}", card.id);
        let _ = writeln!(out, "State: {}", card.state);
        let _ = writeln!(out, "Type: {}", card.console_type);
        let _ = writeln!(out, "Assistant: {}", card.assistant);
        let _ = writeln!(out, "Remote: {}", card.remote);
        let _ = writeln!(out, "Streaming: {}", card.streaming);
        let _ = writeln!(out, "Start stream: {}", card.stream_route);
    }
    out
}
