//! Error taxonomy for the security core.
//!
//! Every operation returns a typed failure instead of aborting, with one
//! deliberate exception: clock regression in the ID generator is surfaced
//! as an unrecoverable error value and the hosting process decides the
//! shutdown policy.

/// Errors produced by the credential and token security core.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    /// Malformed encoded hash or token structure.
    #[error("malformed credential or token structure: {0}")]
    Format(String),

    /// Credential does not match the stored hash.
    #[error("credential does not match")]
    Mismatch,

    /// Missing, unparseable, or wrong-type key material.
    #[error("key material unusable: {0}")]
    Key(String),

    /// Token expiry is in the past.
    #[error("token has expired")]
    Expired,

    /// Token not-before is in the future.
    #[error("token is not yet valid")]
    NotYetValid,

    /// Cryptographic signature verification failed, including rejected
    /// algorithm confusion.
    #[error("signature verification failed: {0}")]
    Signature(String),

    /// The clock moved backward. The generator cannot safely continue;
    /// proceeding would void the identifier-uniqueness contract.
    #[error("clock moved backward by {drift_ms} ms; identifier generation halted")]
    ClockRegression { drift_ms: u64 },

    /// AEAD authentication tag check failed (or the blob was truncated).
    #[error("ciphertext authentication failed")]
    Authentication,

    /// Cipher key is not one of the accepted sizes.
    #[error("invalid cipher key length: {0} bytes (expected 16, 24, or 32)")]
    KeyLength(usize),

    /// Invalid configuration or constructor argument.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SecurityError {
    /// Whether this failure must be collapsed into a generic
    /// "authentication failed" response by upstream login flows, so a
    /// caller cannot distinguish a malformed record from a wrong password.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::Format(_)
                | Self::Mismatch
                | Self::Signature(_)
                | Self::Expired
                | Self::NotYetValid
                | Self::Authentication
        )
    }
}

pub type Result<T> = std::result::Result<T, SecurityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_are_grouped() {
        assert!(SecurityError::Format("x".into()).is_authentication_failure());
        assert!(SecurityError::Mismatch.is_authentication_failure());
        assert!(SecurityError::Signature("x".into()).is_authentication_failure());
        assert!(SecurityError::Expired.is_authentication_failure());
        assert!(SecurityError::NotYetValid.is_authentication_failure());
        assert!(SecurityError::Authentication.is_authentication_failure());
    }

    #[test]
    fn operational_failures_are_not_grouped() {
        assert!(!SecurityError::Key("x".into()).is_authentication_failure());
        assert!(!SecurityError::KeyLength(15).is_authentication_failure());
        assert!(!SecurityError::Config("x".into()).is_authentication_failure());
        assert!(!SecurityError::ClockRegression { drift_ms: 3 }.is_authentication_failure());
    }
}
