//! authcore — credential and token security core.
//!
//! The load-bearing pieces of an authentication backend, kept free of any
//! HTTP, storage, or transport glue:
//! - [`security::password`] — memory-hard password hashing and verification
//! - [`security::token`] — signed stateless claims tokens
//! - [`security::keys`] — PEM key material parsing
//! - [`security::cipher`] — authenticated encryption for sensitive fields
//! - [`snowflake`] — node-scoped unique identifier generation
//!
//! A registration flow hashes the credential and mints the entity's
//! identifier; a login flow verifies the credential and issues a token;
//! every authenticated request validates its token before proceeding.
//! Those flows live in the surrounding service — this crate only supplies
//! the primitives and their error taxonomy ([`SecurityError`]).

pub mod config;
pub mod error;
pub mod security;
pub mod snowflake;

pub use config::SecurityConfig;
pub use error::{Result, SecurityError};
pub use security::cipher::{decrypt, encrypt};
pub use security::password::{hash_password, hash_password_with_salt, verify_password};
pub use security::token::{issue_token, verify_token, Claims, ISSUER, TOKEN_TTL_SECS};
pub use security::KeyPair;
pub use snowflake::{Clock, SnowflakeGenerator, SystemClock};
