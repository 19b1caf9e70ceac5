//! # Domain Layer
//!
//! Vector clocks, the heartbeat record, the peer table and configuration.
//! Everything here is synchronous and free of I/O.

pub mod clock;
pub mod errors;
pub mod message;
pub mod peers;
pub mod value_objects;

pub use clock::*;
pub use errors::*;
pub use message::*;
pub use peers::*;
pub use value_objects::*;
