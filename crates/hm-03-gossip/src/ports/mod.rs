//! Ports the engine depends on.

pub mod outbound;

pub use outbound::{PubSubTransport, RootSource};
