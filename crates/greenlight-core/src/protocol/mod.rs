//! Protocol module containing envelope types, correlation ids, and the JSON codec.

pub mod codec;
pub mod correlation;
pub mod messages;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, ProtocolError,
    RoutingPolicy,
};
pub use correlation::CorrelationId;
pub use messages::*;
