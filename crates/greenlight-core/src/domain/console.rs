//! Console records: the data describing one remote console.
//!
//! A [`ConsoleRecord`] is what the host returns for each device when the UI
//! asks it to enumerate consoles.  The field names on the wire are camelCase
//! because that is how the host process has always spoken; the Rust side uses
//! snake_case and lets serde do the renaming.
//!
//! # Identity
//!
//! The `id` field is an opaque string owned by the host.  It is stable across
//! responses for the same physical device, and the UI uses it verbatim to
//! build the navigation target for a stream session (see
//! [`crate::domain::route::StreamRoute`]).  Wrapping it in [`ConsoleId`]
//! keeps it from being mixed up with the other string fields.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque, host-assigned identifier of a console.
///
/// Serialized transparently as a plain JSON string.  No normalisation is ever
/// applied: the bytes that arrive from the host are the bytes used in stream
/// requests and routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsoleId(String);

impl ConsoleId {
    /// Wraps a host-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier exactly as the host sent it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConsoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConsoleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One remote console as reported by the host.
///
/// # Serde representation
///
/// ```json
/// {
///   "id": "A1",
///   "name": "Box1",
///   "powerState": "On",
///   "consoleType": "Xbox",
///   "digitalAssistantRemoteControlEnabled": true,
///   "remoteManagementEnabled": false,
///   "consoleStreamingEnabled": true
/// }
/// ```
///
/// The three capability flags are independent and default to `false` when
/// the host omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleRecord {
    /// Stable host-assigned identifier, unique within one response.
    pub id: ConsoleId,
    /// Display name chosen by the console owner.
    pub name: String,
    /// Device power status, e.g. `"On"` or `"ConnectedStandby"`.
    ///
    /// Kept as an opaque string; the host adds new states without notice.
    pub power_state: String,
    /// Device model or class, e.g. `"XboxSeriesX"`.
    pub console_type: String,
    /// Whether voice-assistant remote control is enabled.
    #[serde(default)]
    pub digital_assistant_remote_control_enabled: bool,
    /// Whether remote management is enabled.
    #[serde(default)]
    pub remote_management_enabled: bool,
    /// Whether the console accepts streaming sessions.
    #[serde(default)]
    pub console_streaming_enabled: bool,
}

/// A response listed the same console id more than once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate console id in response: {0}")]
pub struct DuplicateConsoleId(pub ConsoleId);

/// Checks that every record in `records` has a distinct id.
///
/// Returns the first repeated id.  Nothing is removed or reordered: a
/// duplicate is a host-side invariant violation, and it is up to the caller
/// to decide whether to reject the response or accept it as-is.
pub fn check_unique_ids(records: &[ConsoleRecord]) -> Result<(), DuplicateConsoleId> {
    let mut seen: HashSet<&ConsoleId> = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(&record.id) {
            return Err(DuplicateConsoleId(record.id.clone()));
        }
    }
    Ok(())
}
