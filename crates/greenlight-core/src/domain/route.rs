//! Navigation target handed to the streaming subsystem.
//!
//! Starting a stream is a page navigation to `stream/<console id>`; the
//! session component on the other side of that route reads the id back out
//! and takes it from there.  This module only builds and parses the route.

use std::fmt;

use thiserror::Error;

use super::console::ConsoleId;

/// Path prefix of the stream session route.
pub const STREAM_ROUTE_PREFIX: &str = "stream/";

/// A route of the form `stream/<id>`.
///
/// The id is embedded verbatim; no percent-encoding or case folding is
/// applied, so `StreamRoute::parse(route.path())` always gives back the
/// same [`ConsoleId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRoute {
    console_id: ConsoleId,
}

/// A path did not look like a stream route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteParseError {
    #[error("path does not start with 'stream/': {0}")]
    WrongPrefix(String),
    #[error("stream route has an empty console id")]
    EmptyId,
}

impl StreamRoute {
    /// Builds the route for `console_id`.
    pub fn new(console_id: ConsoleId) -> Self {
        Self { console_id }
    }

    /// The console this route starts a session against.
    pub fn console_id(&self) -> &ConsoleId {
        &self.console_id
    }

    /// Renders the route path, e.g. `stream/A1`.
    pub fn path(&self) -> String {
        format!("{STREAM_ROUTE_PREFIX}{}", self.console_id)
    }

    /// Parses a `stream/<id>` path.
    ///
    /// A single leading `/` is tolerated so absolute paths work too.
    pub fn parse(path: &str) -> Result<Self, RouteParseError> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let id = trimmed
            .strip_prefix(STREAM_ROUTE_PREFIX)
            .ok_or_else(|| RouteParseError::WrongPrefix(path.to_string()))?;
        if id.is_empty() {
            return Err(RouteParseError::EmptyId);
        }
        Ok(Self::new(ConsoleId::new(id)))
    }
}

impl fmt::Display for StreamRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{STREAM_ROUTE_PREFIX}{}", self.console_id)
    }
}
