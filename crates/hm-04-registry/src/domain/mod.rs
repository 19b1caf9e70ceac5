//! # Domain Layer
//!
//! Tries, stored key material and credential options.

pub mod credential;
pub mod entities;
pub mod errors;
pub mod trie;
pub mod value_objects;

pub use credential::*;
pub use entities::*;
pub use errors::*;
pub use trie::*;
pub use value_objects::*;
