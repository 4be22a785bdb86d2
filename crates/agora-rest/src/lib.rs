//! # Agora REST
//!
//! HTTP surface of the Agora social backend, built on Axum.
//! Every response uses the [`responses::ApiResponse`] envelope.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
