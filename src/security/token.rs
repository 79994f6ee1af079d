//! Stateless RS256 token issuance and verification.
//!
//! Tokens are the usual compact three-part `header.payload.signature`
//! structure, fully self-contained: no server-side store tracks issued or
//! revoked tokens. Verification rejects any declared algorithm other than
//! RS256 before touching the signature, so an unsigned or HMAC-signed token
//! can never be downgraded into acceptance.

use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header,
    Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, SecurityError};

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: u64 = 3600;

/// Fixed issuer embedded in every token.
pub const ISSUER: &str = "authcore";

/// Payload of a signed token. Constructed at issuance, reconstructed at
/// verification, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the authenticated entity's identifier).
    pub sub: String,
    /// Duplicate of `sub` kept for consumers reading the legacy field.
    pub user_id: String,
    /// Email of the authenticated entity.
    pub email: String,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: u64,
    /// Not-before (Unix timestamp, seconds).
    pub nbf: u64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: u64,
    /// Issuer.
    pub iss: String,
}

impl Claims {
    /// Build claims for a token issued now: `iat = nbf = now`,
    /// `exp = now + TOKEN_TTL_SECS`.
    pub fn new(subject: &str, email: &str) -> Self {
        let now = epoch_secs();
        Self {
            sub: subject.to_string(),
            user_id: subject.to_string(),
            email: email.to_string(),
            iat: now,
            nbf: now,
            exp: now + TOKEN_TTL_SECS,
            iss: ISSUER.to_string(),
        }
    }
}

/// Issue a signed token for the given subject and email.
///
/// Fails with [`SecurityError::Key`] when the signing key is unusable.
pub fn issue_token(subject: &str, email: &str, key: &EncodingKey) -> Result<String> {
    let claims = Claims::new(subject, email);
    encode(&Header::new(Algorithm::RS256), &claims, key)
        .map_err(|e| SecurityError::Key(format!("token signing failed: {e}")))
}

/// Verify a token's structure, algorithm, signature, and validity window,
/// returning the embedded claims on success.
pub fn verify_token(token: &str, key: &DecodingKey) -> Result<Claims> {
    let header =
        decode_header(token).map_err(|e| SecurityError::Format(format!("invalid token: {e}")))?;
    if header.alg != Algorithm::RS256 {
        return Err(SecurityError::Signature(format!(
            "unexpected signing algorithm {:?}",
            header.alg
        )));
    }

    let mut validation = Validation::new(Algorithm::RS256);
    // `exp > now` and `nbf <= now` exactly; no leeway window.
    validation.leeway = 0;
    validation.validate_nbf = true;

    match decode::<Claims>(token, key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(err) => Err(map_token_error(err)),
    }
}

fn map_token_error(err: jsonwebtoken::errors::Error) -> SecurityError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => SecurityError::Expired,
        ErrorKind::ImmatureSignature => SecurityError::NotYetValid,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
            SecurityError::Signature(err.to_string())
        }
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
            SecurityError::Key(err.to_string())
        }
        _ => SecurityError::Format(err.to_string()),
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::keys::fixtures::*;
    use crate::security::keys::{parse_private_key, parse_public_key};

    #[test]
    fn issue_then_verify_roundtrip() {
        let signing = parse_private_key(RSA_PRIVATE_A).unwrap();
        let verifying = parse_public_key(RSA_PUBLIC_A).unwrap();

        let token = issue_token("user-42", "user@example.com", &signing).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = verify_token(&token, &verifying).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.user_id, "user-42");
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn claims_serialize_to_jwt_field_names() {
        let claims = Claims::new("u1", "u1@example.com");
        let value = serde_json::to_value(&claims).unwrap();
        for field in ["sub", "user_id", "email", "iat", "nbf", "exp", "iss"] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
    }

    #[test]
    fn wrong_public_key_is_signature_error() {
        let signing = parse_private_key(RSA_PRIVATE_A).unwrap();
        let wrong = parse_public_key(RSA_PUBLIC_B).unwrap();

        let token = issue_token("user-42", "user@example.com", &signing).unwrap();
        let err = verify_token(&token, &wrong).unwrap_err();
        assert!(matches!(err, SecurityError::Signature(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let signing = parse_private_key(RSA_PRIVATE_A).unwrap();
        let verifying = parse_public_key(RSA_PUBLIC_A).unwrap();

        let mut claims = Claims::new("user-42", "user@example.com");
        claims.iat = claims.iat.saturating_sub(7200);
        claims.nbf = claims.iat;
        claims.exp = claims.iat + TOKEN_TTL_SECS;
        let token = encode(&Header::new(Algorithm::RS256), &claims, &signing).unwrap();

        let err = verify_token(&token, &verifying).unwrap_err();
        assert!(matches!(err, SecurityError::Expired));
    }

    #[test]
    fn premature_token_is_rejected() {
        let signing = parse_private_key(RSA_PRIVATE_A).unwrap();
        let verifying = parse_public_key(RSA_PUBLIC_A).unwrap();

        let mut claims = Claims::new("user-42", "user@example.com");
        claims.nbf = claims.iat + 3600;
        claims.exp = claims.iat + 7200;
        let token = encode(&Header::new(Algorithm::RS256), &claims, &signing).unwrap();

        let err = verify_token(&token, &verifying).unwrap_err();
        assert!(matches!(err, SecurityError::NotYetValid));
    }

    #[test]
    fn hmac_signed_token_is_rejected() {
        // Algorithm-confusion attempt: a token signed with HS256 must fail
        // before any signature check happens.
        let claims = Claims::new("user-42", "user@example.com");
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"shared-secret"),
        )
        .unwrap();

        let verifying = parse_public_key(RSA_PUBLIC_A).unwrap();
        let err = verify_token(&token, &verifying).unwrap_err();
        assert!(matches!(err, SecurityError::Signature(_)));
    }

    #[test]
    fn garbage_token_is_format_error() {
        let verifying = parse_public_key(RSA_PUBLIC_A).unwrap();
        for bad in ["", "abc", "a.b", "not a token at all"] {
            let err = verify_token(bad, &verifying).unwrap_err();
            assert!(matches!(err, SecurityError::Format(_)), "input: {bad:?}");
        }
    }
}
