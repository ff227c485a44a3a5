//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session token generation and validation.
//! - [`cookie`] -- the `reno_session` cookie carrying the token.

pub mod cookie;
pub mod jwt;
pub mod password;
