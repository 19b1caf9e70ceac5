//! # Node Runtime Library
//!
//! Configuration, subsystem wiring and the runtime loop of a Hypergraph Mesh
//! node. The `node-runtime` binary is a thin wrapper around [`NodeRuntime`].

pub mod container;
pub mod runtime;

pub use container::{load_config, ConfigError, IdentityConfig, NodeConfig, SubsystemContainer};
pub use runtime::NodeRuntime;
