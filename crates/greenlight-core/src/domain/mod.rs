//! Domain types: console records and the stream navigation route.
//!
//! Nothing in here performs I/O or knows about the channel; these are the
//! values that travel inside envelopes and the rules they obey.

pub mod console;
pub mod route;

pub use console::{check_unique_ids, ConsoleId, ConsoleRecord, DuplicateConsoleId};
pub use route::{RouteParseError, StreamRoute, STREAM_ROUTE_PREFIX};
