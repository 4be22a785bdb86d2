//! # Agora Security
//!
//! Identity provider seam, JWT ID/refresh tokens, Argon2 password hashing
//! and role checks.

pub mod identity;
pub mod jwt;
pub mod password;
pub mod rbac;

pub use identity::*;
pub use jwt::*;
pub use password::*;
pub use rbac::*;
