//! Identity provider seam.
//!
//! Credentials, token issuance and revocation belong to the identity
//! provider. Everything else in the workspace talks to it through
//! [`IdentityProvider`]; [`LocalIdentityProvider`] is the in-process
//! implementation used for development and tests.

mod local;
mod provider;

pub use local::LocalIdentityProvider;
pub use provider::*;
