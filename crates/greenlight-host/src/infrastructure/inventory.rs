//! Console inventory: a TOML file of consoles served by [`InventoryProvider`].
//!
//! # File format
//!
//! ```toml
//! [[consoles]]
//! id = "F4001ABCDEF"
//! name = "Living room"
//! power_state = "On"
//! console_type = "XboxSeriesX"
//! digital_assistant_remote_control_enabled = false
//! remote_management_enabled = true
//! console_streaming_enabled = true
//! ```
//!
//! Only `id` and `name` are required.  Entries are served in file order.
//! Duplicate ids are rejected at load time so the host never sends a list
//! that breaks the unique-id rule.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use greenlight_core::{check_unique_ids, ConsoleId, ConsoleRecord, DuplicateConsoleId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::provider::{ConsoleProvider, ProviderError};

/// Errors that can occur while loading an inventory file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading inventory at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse inventory TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid inventory: {0}")]
    DuplicateId(#[from] DuplicateConsoleId),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct InventoryFile {
    #[serde(default)]
    consoles: Vec<InventoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct InventoryEntry {
    id: String,
    name: String,
    #[serde(default = "default_power_state")]
    power_state: String,
    #[serde(default = "default_console_type")]
    console_type: String,
    #[serde(default)]
    digital_assistant_remote_control_enabled: bool,
    #[serde(default)]
    remote_management_enabled: bool,
    #[serde(default = "default_true")]
    console_streaming_enabled: bool,
}

fn default_power_state() -> String {
    "On".to_string()
}
fn default_console_type() -> String {
    "XboxOne".to_string()
}
fn default_true() -> bool {
    true
}

impl From<InventoryEntry> for ConsoleRecord {
    fn from(entry: InventoryEntry) -> Self {
        Self {
            id: ConsoleId::new(entry.id),
            name: entry.name,
            power_state: entry.power_state,
            console_type: entry.console_type,
            digital_assistant_remote_control_enabled: entry
                .digital_assistant_remote_control_enabled,
            remote_management_enabled: entry.remote_management_enabled,
            console_streaming_enabled: entry.console_streaming_enabled,
        }
    }
}

/// Parses inventory TOML into console records.
pub fn parse_inventory(text: &str) -> Result<Vec<ConsoleRecord>, ConfigError> {
    let file: InventoryFile = toml::from_str(text)?;
    let records: Vec<ConsoleRecord> = file.consoles.into_iter().map(Into::into).collect();
    check_unique_ids(&records)?;
    Ok(records)
}

/// Reads and parses the inventory file at `path`.
pub fn load_inventory(path: &Path) -> Result<Vec<ConsoleRecord>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let records = parse_inventory(&text)?;
    info!("loaded {} console(s) from {}", records.len(), path.display());
    Ok(records)
}

/// Serves a fixed list of consoles.
#[derive(Debug, Clone, Default)]
pub struct InventoryProvider {
    consoles: Vec<ConsoleRecord>,
}

impl InventoryProvider {
    pub fn new(consoles: Vec<ConsoleRecord>) -> Self {
        Self { consoles }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        load_inventory(path).map(Self::new)
    }
}

#[async_trait]
impl ConsoleProvider for InventoryProvider {
    async fn list_consoles(&self) -> Result<Vec<ConsoleRecord>, ProviderError> {
        Ok(self.consoles.clone())
    }

    async fn start_stream(&self, console_id: &ConsoleId) -> Result<String, ProviderError> {
        let record = self
            .consoles
            .iter()
            .find(|r| &r.id == console_id)
            .ok_or_else(|| ProviderError::UnknownConsole(console_id.clone()))?;
        if !record.console_streaming_enabled {
            return Err(ProviderError::StreamingDisabled(console_id.clone()));
        }
        Ok(Uuid::new_v4().to_string())
    }
}
