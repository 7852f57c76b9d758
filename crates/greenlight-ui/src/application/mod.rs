//! Application layer for greenlight-ui.
//!
//! - [`transport`] – the port every channel transport implements.
//! - [`registry`]  – who receives which inbound envelope.
//! - [`issuer`]    – builds and sends requests.
//! - [`router`]    – per-request-cycle state machine.
//! - [`presenter`] – where failures are shown to the user.
//! - [`bus`]       – transport + registry + pump, shared by all scopes.
//! - [`scope`]     – one mounted console list view.

pub mod bus;
pub mod issuer;
pub mod presenter;
pub mod registry;
pub mod router;
pub mod scope;
pub mod transport;

pub use bus::ConsoleBus;
pub use issuer::{IssueError, RequestIssuer};
pub use presenter::{ErrorPresenter, TracingPresenter};
pub use registry::{Delivery, DispatchRegistry, Interest, OwnerId, SubscriptionId};
pub use router::{CycleState, ResponseRouter, RouteError, RouteOutcome, StreamSession};
pub use scope::{ConsoleListScope, ScopeStatus};
pub use transport::{ChannelTransport, TransportError};
