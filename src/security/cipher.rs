//! Authenticated encryption for at-rest secrets.
//!
//! AES-GCM with 128/192/256-bit keys. Every encrypt call draws a fresh
//! random 96-bit nonce; the output blob is `[nonce (12 bytes)][ciphertext
//! + tag (16 bytes)]`. No two blobs under the same key may share a nonce.
//!
//! This is an optional hook for persistence layers to protect sensitive
//! fields before writing; key material comes from external secret storage.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{aes::Aes192, Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use rand::RngCore;

use crate::error::{Result, SecurityError};

/// AES-GCM nonce size (96 bits).
const NONCE_SIZE: usize = 12;

/// AES-192-GCM; the aes-gcm crate only aliases the 128- and 256-bit sizes.
type Aes192Gcm = AesGcm<Aes192, U12>;

/// Encrypt a plaintext blob, returning `nonce ‖ ciphertext ‖ tag`.
///
/// The key must be 16, 24, or 32 bytes; anything else is
/// [`SecurityError::KeyLength`].
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    match key.len() {
        16 => seal::<Aes128Gcm>(key, plaintext),
        24 => seal::<Aes192Gcm>(key, plaintext),
        32 => seal::<Aes256Gcm>(key, plaintext),
        n => Err(SecurityError::KeyLength(n)),
    }
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Truncated blobs and failed tag checks are both
/// [`SecurityError::Authentication`].
pub fn decrypt(blob: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    match key.len() {
        16 => open::<Aes128Gcm>(key, blob),
        24 => open::<Aes192Gcm>(key, blob),
        32 => open::<Aes256Gcm>(key, blob),
        n => Err(SecurityError::KeyLength(n)),
    }
}

fn seal<C>(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: Aead + KeyInit + AeadCore<NonceSize = U12>,
{
    let cipher = C::new_from_slice(key).map_err(|_| SecurityError::KeyLength(key.len()))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| SecurityError::Authentication)?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

fn open<C>(key: &[u8], blob: &[u8]) -> Result<Vec<u8>>
where
    C: Aead + KeyInit + AeadCore<NonceSize = U12>,
{
    if blob.len() < NONCE_SIZE {
        return Err(SecurityError::Authentication);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = C::new_from_slice(key).map_err(|_| SecurityError::KeyLength(key.len()))?;
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| SecurityError::Authentication)
}
