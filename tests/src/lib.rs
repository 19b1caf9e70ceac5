//! # Hypergraph Mesh Test Suite
//!
//! Cross-crate flows that no single crate can test on its own.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── gossip_mesh.rs      # Several engines on one in-memory bus
//!     ├── registry_flows.rs   # Registration, lookup and sealed credentials
//!     └── node_lifecycle.rs   # Full node wiring, start and shutdown
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hm-tests
//! cargo test -p hm-tests integration::gossip_mesh::
//! ```

pub mod integration;
