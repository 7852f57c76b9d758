//! Correlation ids linking a request envelope to its response.
//!
//! # Why correlation ids? (for beginners)
//!
//! All traffic shares one channel.  If the UI sends two `get_consoles`
//! requests and two answers come back, the message kind alone cannot tell
//! which answer belongs to which request.  Every outbound request therefore
//! carries a freshly generated UUID, and the host copies that UUID into every
//! envelope it sends in reply.  The UI can then drop answers to requests it
//! no longer cares about (for example, requests issued by a component that
//! has since been unmounted).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique token echoed from request to response.
///
/// Serialized as the canonical hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generates a new random (v4) correlation id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CorrelationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
