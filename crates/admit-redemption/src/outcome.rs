//! # Redemption Outcome Taxonomy
//!
//! Every scan resolves to exactly one of three outcomes. Denials carry a
//! machine-readable reason; "already used" additionally carries the
//! original redemption metadata so gate staff can see who scanned it and
//! when.

use serde::{Deserialize, Serialize};

use admit_core::{CredentialRecord, Timestamp};

/// Why a presented token was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The token failed to unseal: wrong key, bit damage, truncation, or
    /// a forgery. Indistinguishable by design.
    CorruptOrTampered,
    /// The token unsealed but no record exists under this entry id and
    /// shop.
    UnknownEntry,
    /// The record exists but its status forbids admission
    /// (`INVALID`, `CANCELLED`, or not yet activated).
    EntryInvalidated,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CorruptOrTampered => "corrupt_or_tampered",
            Self::UnknownEntry => "unknown_entry",
            Self::EntryInvalidated => "entry_invalidated",
        };
        f.write_str(s)
    }
}

/// Result of one mutating redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RedemptionOutcome {
    /// This scan won the `VALID → SCANNED` transition. Admit the bearer.
    Admitted { record: CredentialRecord },
    /// The entry was already scanned, by an earlier presentation or by a
    /// concurrent scan that won the race.
    AlreadyUsed {
        record: CredentialRecord,
        redeemed_at: Option<Timestamp>,
        redeemed_by: Option<String>,
    },
    /// The token is denied. The bearer is not admitted.
    Invalid { reason: DenialReason },
}

/// Status reported by the non-mutating check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// The backing record is `VALID`; a redeem now would admit.
    Redeemable,
    /// The backing record is already `SCANNED`.
    AlreadyUsed,
    /// The token or record is not admissible.
    Invalid,
}

/// Full result of a non-mutating check: status plus whatever context is
/// available.
#[derive(Debug, Clone, Serialize)]
pub struct TokenCheck {
    pub status: TokenStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<CredentialRecord>,
}

impl TokenCheck {
    pub fn denied(reason: DenialReason) -> Self {
        Self {
            status: TokenStatus::Invalid,
            reason: Some(reason),
            record: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_reason_wire_names() {
        assert_eq!(
            serde_json::to_string(&DenialReason::CorruptOrTampered).unwrap(),
            "\"corrupt_or_tampered\""
        );
        assert_eq!(
            serde_json::to_string(&DenialReason::UnknownEntry).unwrap(),
            "\"unknown_entry\""
        );
        assert_eq!(
            serde_json::to_string(&DenialReason::EntryInvalidated).unwrap(),
            "\"entry_invalidated\""
        );
    }

    #[test]
    fn test_outcome_tagging() {
        let json = serde_json::to_value(RedemptionOutcome::Invalid {
            reason: DenialReason::UnknownEntry,
        })
        .unwrap();
        assert_eq!(json["outcome"], "invalid");
        assert_eq!(json["reason"], "unknown_entry");
    }

    #[test]
    fn test_token_status_wire_names() {
        assert_eq!(serde_json::to_string(&TokenStatus::Redeemable).unwrap(), "\"redeemable\"");
        assert_eq!(serde_json::to_string(&TokenStatus::AlreadyUsed).unwrap(), "\"already_used\"");
    }
}
