//! Argon2id password hashing with a self-describing encoded format.
//!
//! Hashes are stored as `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`
//! (unpadded standard base64, exactly six `$`-delimited fields). The cost
//! parameters travel inside the record, so verification never depends on
//! current defaults: historical records hashed with different costs still
//! verify with the parameters they were created with.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::error::{Result, SecurityError};

/// Salt byte length for freshly generated salts.
const SALT_LEN: usize = 16;

/// Derived key byte length.
const HASH_LEN: usize = 32;

/// Argon2id iteration count.
const T_COST: u32 = 3;

/// Argon2id memory cost in KiB (64 MiB).
const M_COST_KIB: u32 = 64 * 1024;

/// Argon2id lane count.
const P_COST: u32 = 4;

/// Hash a password with a freshly generated random 16-byte salt.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    hash_password_with_salt(password, &salt)
}

/// Hash a password with a caller-supplied salt.
///
/// The salt is embedded in the encoded result; callers normally want
/// [`hash_password`] and its random salt.
pub fn hash_password_with_salt(password: &str, salt: &[u8]) -> Result<String> {
    let hash = derive_key(
        password.as_bytes(),
        salt,
        Version::V0x13,
        M_COST_KIB,
        T_COST,
        P_COST,
        HASH_LEN,
    )?;

    Ok(format!(
        "$argon2id$v={}$m={},t={},p={}${}${}",
        Version::V0x13 as u32,
        M_COST_KIB,
        T_COST,
        P_COST,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(&hash),
    ))
}

/// Verify a password against an encoded hash record.
///
/// Returns `Ok(false)` on a clean mismatch. Structural deviations — wrong
/// field count, unknown algorithm tag or version, malformed parameter block,
/// bad base64 — are [`SecurityError::Format`], which upstream login flows
/// must collapse into the same generic failure as a mismatch.
///
/// The recomputed hash is compared against the stored one with a full-length
/// constant-time comparison; there is no early exit on the first differing
/// byte. Parameter parsing itself may short-circuit — cost parameters are
/// not secret.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool> {
    let parts: Vec<&str> = encoded.split('$').collect();
    if parts.len() != 6 {
        return Err(SecurityError::Format(format!(
            "expected 6 '$'-delimited fields, found {}",
            parts.len()
        )));
    }
    if !parts[0].is_empty() {
        return Err(SecurityError::Format(
            "missing leading '$' delimiter".into(),
        ));
    }
    if parts[1] != "argon2id" {
        return Err(SecurityError::Format(format!(
            "unsupported algorithm tag '{}'",
            parts[1]
        )));
    }

    let version = parse_version(parts[2])?;
    let (m_cost, t_cost, p_cost) = parse_params(parts[3])?;

    let salt = STANDARD_NO_PAD
        .decode(parts[4])
        .map_err(|e| SecurityError::Format(format!("invalid salt encoding: {e}")))?;
    let stored_hash = STANDARD_NO_PAD
        .decode(parts[5])
        .map_err(|e| SecurityError::Format(format!("invalid hash encoding: {e}")))?;

    // Recompute with the decoded parameters and the stored hash's length,
    // not the current defaults.
    let computed = derive_key(
        password.as_bytes(),
        &salt,
        version,
        m_cost,
        t_cost,
        p_cost,
        stored_hash.len(),
    )?;

    Ok(bool::from(computed.ct_eq(&stored_hash)))
}

/// Parse the `v=<int>` field into a known Argon2 version.
fn parse_version(field: &str) -> Result<Version> {
    let raw = field
        .strip_prefix("v=")
        .ok_or_else(|| SecurityError::Format(format!("invalid version field '{field}'")))?;
    let number: u32 = raw
        .parse()
        .map_err(|_| SecurityError::Format(format!("invalid version number '{raw}'")))?;
    match number {
        16 => Ok(Version::V0x10),
        19 => Ok(Version::V0x13),
        other => Err(SecurityError::Format(format!(
            "unknown argon2 version {other}"
        ))),
    }
}

/// Parse the `m=<int>,t=<int>,p=<int>` parameter block, rejecting any
/// deviation in field order or count.
fn parse_params(field: &str) -> Result<(u32, u32, u32)> {
    let mut items = field.split(',');
    let m = parse_cost(items.next(), "m")?;
    let t = parse_cost(items.next(), "t")?;
    let p = parse_cost(items.next(), "p")?;
    if items.next().is_some() {
        return Err(SecurityError::Format(format!(
            "trailing data in parameter block '{field}'"
        )));
    }
    Ok((m, t, p))
}

fn parse_cost(item: Option<&str>, name: &str) -> Result<u32> {
    let item = item
        .ok_or_else(|| SecurityError::Format(format!("missing '{name}=' cost parameter")))?;
    let raw = item
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('='))
        .ok_or_else(|| SecurityError::Format(format!("invalid cost parameter '{item}'")))?;
    raw.parse()
        .map_err(|_| SecurityError::Format(format!("invalid cost value '{raw}'")))
}

/// Run the Argon2id KDF with explicit parameters.
fn derive_key(
    password: &[u8],
    salt: &[u8],
    version: Version,
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
    out_len: usize,
) -> Result<Vec<u8>> {
    let params = Params::new(m_cost, t_cost, p_cost, Some(out_len))
        .map_err(|e| SecurityError::Format(format!("invalid argon2 parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, version, params);

    let mut out = vec![0u8; out_len];
    argon2
        .hash_password_into(password, salt, &mut out)
        .map_err(|e| SecurityError::Format(format!("key derivation failed: {e}")))?;
    Ok(out)
}
