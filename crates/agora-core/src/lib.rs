//! # Agora Core
//!
//! Core types, traits, and error definitions for the Agora social backend.
//! This crate provides the foundational abstractions used by the store,
//! security, service and REST layers.

pub mod domain;
pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod traits;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
pub use validation::*;
