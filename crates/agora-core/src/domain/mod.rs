//! Domain entities and value objects.
//!
//! Entities are stored as documents; timestamps serialize as epoch
//! milliseconds so that store queries order them numerically.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
