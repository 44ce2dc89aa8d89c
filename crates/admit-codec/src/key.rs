//! # Seal Key — Process-Wide Symmetric Secret
//!
//! The 32-byte AES-256-GCM key shared by every seal/unseal call in one
//! deployment. It is injected explicitly into codec operations — never read
//! from ambient global state — so tests can use throwaway keys and a future
//! rotation scheme can thread versioned keys through the same seams.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::seal::CodecError;

/// A 32-byte symmetric seal key.
///
/// Zeroized on drop. `Debug` never prints key material.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SealKey([u8; 32]);

impl SealKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex string, the configuration wire form.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidKey`] if the string is not exactly
    /// 64 hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, CodecError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(CodecError::InvalidKey(format!(
                "seal key must be 64 hex characters (32 bytes), got {}",
                hex.len()
            )));
        }

        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| CodecError::InvalidKey("seal key is not valid hex".to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| CodecError::InvalidKey("seal key is not valid hex".to_string()))?;
        }
        Ok(Self(bytes))
    }

    /// Access the raw key bytes.
    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SealKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SealKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_roundtrip() {
        let hex = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
        let key = SealKey::from_hex(hex).unwrap();
        assert_eq!(key.as_bytes()[0], 0x00);
        assert_eq!(key.as_bytes()[31], 0xff);
    }

    #[test]
    fn test_from_hex_rejects_short() {
        assert!(SealKey::from_hex("deadbeef").is_err());
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let bad = "zz112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
        assert!(SealKey::from_hex(bad).is_err());
    }

    #[test]
    fn test_debug_redacts() {
        let key = SealKey::from_bytes([7u8; 32]);
        assert_eq!(format!("{key:?}"), "SealKey(..)");
    }
}
