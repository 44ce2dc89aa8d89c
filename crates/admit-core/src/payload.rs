//! # Credential Payload — Plaintext Sealed Inside Every Token
//!
//! The payload is a strict tagged structure: every field is required and
//! unknown fields are rejected at the deserialization boundary. A token
//! that decrypts to anything else is corrupt, full stop.
//!
//! ## Invariant
//!
//! The payload is never mutated in place. A status change (scan,
//! cancellation) is reflected only in the backing [`CredentialRecord`]
//! (`crate::record`) — tokens are not re-sealed. The embedded `valid` and
//! `used` flags exist so a fully offline scanner can run a pre-check; the
//! authoritative admit/deny decision always comes from the record.

use serde::{Deserialize, Serialize};

use crate::identity::EntryId;
use crate::temporal::Timestamp;

/// The plaintext structure sealed inside every token.
///
/// Wire keys match the deployed token format, so previously issued tokens
/// remain decodable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialPayload {
    /// Primary key of the backing record. Globally unique, immutable.
    pub entry_id: EntryId,
    /// Human-readable order reference (e.g. `#1001`). Not authoritative
    /// for lookup.
    #[serde(rename = "shopify_order")]
    pub order_reference: String,
    /// Purchaser identity (email).
    #[serde(rename = "buyer")]
    pub buyer_identity: String,
    /// Ticket class/type label.
    #[serde(rename = "ticket_type")]
    pub category_label: String,
    /// Advisory validity flag for offline pre-checks.
    pub valid: bool,
    /// Advisory used flag for offline pre-checks.
    pub used: bool,
    /// Issuance instant.
    #[serde(rename = "timestamp")]
    pub issued_at: Timestamp,
}

impl CredentialPayload {
    /// Build the payload for a freshly minted credential
    /// (`valid = true`, `used = false`, issued now).
    pub fn freshly_minted(
        entry_id: EntryId,
        order_reference: impl Into<String>,
        buyer_identity: impl Into<String>,
        category_label: impl Into<String>,
    ) -> Self {
        Self {
            entry_id,
            order_reference: order_reference.into(),
            buyer_identity: buyer_identity.into(),
            category_label: category_label.into(),
            valid: true,
            used: false,
            issued_at: Timestamp::now(),
        }
    }
}
