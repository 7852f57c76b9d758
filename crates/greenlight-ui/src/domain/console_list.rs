//! Console List State: the last accepted console list.
//!
//! The list is only ever replaced as a whole.  There is no merge, no
//! per-field update, and no de-duplication: if the host sends the same id
//! twice, the caller decides whether to accept that (see the response
//! router), and this type stores exactly what it was given.

use greenlight_core::{ConsoleId, ConsoleRecord};

/// Process-local console list owned by one mounted scope.
///
/// Created empty at mount, replaced on each accepted response, discarded at
/// unmount.  `revision` counts replacements so a renderer can tell whether
/// anything changed since it last looked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleListState {
    records: Vec<ConsoleRecord>,
    revision: u64,
}

impl ConsoleListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in `records` as the complete new list.
    pub fn replace(&mut self, records: Vec<ConsoleRecord>) {
        self.records = records;
        self.revision += 1;
    }

    /// The current list, in host order.
    pub fn consoles(&self) -> &[ConsoleRecord] {
        &self.records
    }

    pub fn get(&self, id: &ConsoleId) -> Option<&ConsoleRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &ConsoleId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of replacements since creation.  `0` means nothing has been
    /// accepted yet.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
