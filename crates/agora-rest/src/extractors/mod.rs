//! Custom Axum extractors.

mod claims;
mod query;
mod validated;

pub use claims::*;
pub use query::*;
pub use validated::*;
