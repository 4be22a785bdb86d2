//! # Agora Config
//!
//! Configuration management for Agora.
//! Supports layered configuration from files and environment variables,
//! validated up front, with runtime refresh.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
