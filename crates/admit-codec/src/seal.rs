//! # Seal / Unseal — AES-256-GCM over Canonical JSON
//!
//! Pure functions over (payload, key). No I/O, no ambient state.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use admit_core::{CredentialPayload, SealedToken};

use crate::key::SealKey;

/// GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;
/// GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Errors raised by the credential codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The token is malformed, truncated, tampered with, or was sealed
    /// under a different key. Deliberately indistinguishable — there is no
    /// oracle separating key mismatch from corruption.
    #[error("token is corrupt or was sealed under a different key")]
    Corrupt,

    /// Sealing failed. Should not occur for well-formed payloads.
    #[error("failed to seal payload")]
    Seal,

    /// The configured key material is unusable.
    #[error("invalid seal key: {0}")]
    InvalidKey(String),
}

/// Serialize and encrypt a payload into an opaque token string.
///
/// Non-deterministic: a fresh nonce is drawn per call, so equal payloads
/// yield unequal tokens. Reversible only with the same key.
///
/// # Errors
///
/// Returns [`CodecError::Seal`] if serialization or encryption fails.
pub fn seal(payload: &CredentialPayload, key: &SealKey) -> Result<SealedToken, CodecError> {
    let plaintext = serde_json::to_vec(payload).map_err(|_| CodecError::Seal)?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CodecError::Seal)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_slice())
        .map_err(|_| CodecError::Seal)?;

    let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    framed.extend_from_slice(&nonce);
    framed.extend_from_slice(&ciphertext);

    Ok(SealedToken::new(BASE64.encode(framed)))
}

/// Decrypt and deserialize a token back into its payload.
///
/// Fails closed: every malformation — bad base64, truncation, a failed
/// authentication tag, or plaintext that does not parse as a strict
/// [`CredentialPayload`] — yields the same [`CodecError::Corrupt`].
pub fn unseal(token: &SealedToken, key: &SealKey) -> Result<CredentialPayload, CodecError> {
    let framed = BASE64.decode(token.as_str()).map_err(|_| CodecError::Corrupt)?;
    if framed.len() < NONCE_LEN + TAG_LEN {
        return Err(CodecError::Corrupt);
    }

    let (nonce_bytes, ciphertext) = framed.split_at(NONCE_LEN);
    let nonce = Nonce::clone_from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CodecError::Corrupt)?;
    let plaintext = cipher.decrypt(&nonce, ciphertext).map_err(|_| CodecError::Corrupt)?;

    serde_json::from_slice(&plaintext).map_err(|_| CodecError::Corrupt)
}
