//! # Domain Layer
//!
//! Pure identity logic: paths, roles, HD derivation and sealing. No I/O.

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use services::*;
pub use value_objects::*;
