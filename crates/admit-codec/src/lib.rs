//! # admit-codec — Credential Codec
//!
//! Serializes credential payloads to canonical JSON and seals them with
//! AES-256-GCM into opaque token strings. The token is what ends up inside
//! the scannable image; the codec is the only code in the workspace that
//! ever sees plaintext and ciphertext side by side.
//!
//! ## Token Wire Format
//!
//! ```text
//! base64( nonce[12] ‖ ciphertext-with-tag )
//! ```
//!
//! The nonce is drawn fresh from the OS CSPRNG for every seal, so sealing
//! the same payload twice yields different tokens. GCM authenticates the
//! ciphertext: any bit flip, truncation, or wrong-key attempt fails the tag
//! check before a single plaintext byte is released.
//!
//! ## Security Invariant
//!
//! All unseal failure modes collapse into one opaque [`CodecError::Corrupt`]
//! value. A scanner (or an attacker driving one) cannot distinguish "wrong
//! key" from "flipped byte" from "not base64 at all" — there is no padding
//! or parsing oracle.
//!
//! Key rotation/versioning is out of scope: a leaked key voids the
//! confidentiality (not the uniqueness) of every token ever minted.

mod key;
mod seal;

pub use key::SealKey;
pub use seal::{seal, unseal, CodecError};
