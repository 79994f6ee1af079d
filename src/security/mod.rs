//! Credential and token security primitives.
//!
//! Provides:
//! - Argon2id password hashing with a self-describing encoded format
//! - RS256 stateless token issuance and validation
//! - PEM key material parsing for the token layer
//! - AES-GCM authenticated encryption for at-rest secrets
//!
//! ## Design Decisions
//! - Every component here is pure and stateless; calls are independently
//!   reentrant from any number of threads without external locking.
//! - Hash cost parameters are embedded in each credential record, so old
//!   records verify with the parameters they were created with.
//! - Token verification pins the RS256 algorithm before any signature
//!   check, closing the algorithm-confusion downgrade path.

pub mod cipher;
pub mod keys;
pub mod password;
pub mod token;

pub use keys::KeyPair;
pub use token::Claims;
