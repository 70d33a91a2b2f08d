//! # auth-adapters
//!
//! Implementations of the `PasswordHasher` and `TokenProvider` ports.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenProvider;
