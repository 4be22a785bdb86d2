//! # Agora Server Library
//!
//! Wiring and startup utilities for the Agora server binary.

pub mod di;
pub mod startup;
pub mod telemetry;
