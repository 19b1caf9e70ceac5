//! # Subsystem Container
//!
//! Owns the node's subsystems and wires them together: the identity feeds
//! the gossip engine, the content log feeds it roots, and the registry runs
//! beside them without taking part in gossip.

pub mod config;
pub mod subsystems;

pub use config::{load_config, ConfigError, IdentityConfig, NodeConfig};
pub use subsystems::SubsystemContainer;
