//! # Credential Status State Machine
//!
//! Models the lifecycle of one entry credential from minting through
//! redemption or administrative invalidation.
//!
//! ## States
//!
//! ```text
//! Pending ──▶ Valid ──▶ Scanned (terminal)
//!               │
//!               ├──▶ Invalid   (terminal, administrative)
//!               └──▶ Cancelled (terminal, administrative)
//! ```
//!
//! `Valid → Scanned` is the only transition the redemption engine performs,
//! and the store must apply it as an atomic conditional update. Everything
//! that needs to ask "is this move legal" goes through [`can_transition`] —
//! there are no scattered string comparisons against status names.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The lifecycle state of a credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    /// Minted but not yet released for redemption.
    Pending,
    /// Live and redeemable exactly once.
    Valid,
    /// Redeemed at a point of entry (terminal).
    Scanned,
    /// Administratively voided (terminal).
    Invalid,
    /// Cancelled, e.g. after an order cancellation (terminal).
    Cancelled,
}

impl CredentialStatus {
    /// Whether this state is terminal for the redemption path.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Scanned | Self::Invalid | Self::Cancelled)
    }

    /// Whether a credential in this state may be redeemed.
    pub fn is_redeemable(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Whether the transition `from → to` is legal.
///
/// This is the single authority on transition legality. The redemption
/// engine only ever drives `Valid → Scanned`; the administrative surface
/// drives `Valid → Invalid` and `Valid → Cancelled`; `Pending → Valid`
/// covers release of pre-minted credentials.
pub fn can_transition(from: CredentialStatus, to: CredentialStatus) -> bool {
    use CredentialStatus::*;
    matches!(
        (from, to),
        (Pending, Valid) | (Valid, Scanned) | (Valid, Invalid) | (Valid, Cancelled)
    )
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Valid => "VALID",
            Self::Scanned => "SCANNED",
            Self::Invalid => "INVALID",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

impl FromStr for CredentialStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "VALID" => Ok(Self::Valid),
            "SCANNED" => Ok(Self::Scanned),
            "INVALID" => Ok(Self::Invalid),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CredentialStatus::*;

    #[test]
    fn test_legal_transitions() {
        assert!(can_transition(Pending, Valid));
        assert!(can_transition(Valid, Scanned));
        assert!(can_transition(Valid, Invalid));
        assert!(can_transition(Valid, Cancelled));
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        for terminal in [Scanned, Invalid, Cancelled] {
            for to in [Pending, Valid, Scanned, Invalid, Cancelled] {
                assert!(!can_transition(terminal, to), "{terminal} -> {to} must be illegal");
            }
        }
    }

    #[test]
    fn test_no_unscan() {
        assert!(!can_transition(Scanned, Valid));
    }

    #[test]
    fn test_pending_cannot_skip_to_scanned() {
        assert!(!can_transition(Pending, Scanned));
    }

    #[test]
    fn test_self_transitions_illegal() {
        for s in [Pending, Valid, Scanned, Invalid, Cancelled] {
            assert!(!can_transition(s, s));
        }
    }

    #[test]
    fn test_display_and_parse_roundtrip() {
        for s in [Pending, Valid, Scanned, Invalid, Cancelled] {
            let parsed: CredentialStatus = s.to_string().parse().unwrap();
            assert_eq!(parsed, s);
        }
        // Case-insensitive parse for query parameters.
        assert_eq!("scanned".parse::<CredentialStatus>().unwrap(), Scanned);
        assert!("EXPIRED".parse::<CredentialStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_uppercase_wire_form() {
        let json = serde_json::to_string(&Valid).unwrap();
        assert_eq!(json, "\"VALID\"");
    }

    #[test]
    fn test_redeemable_predicate() {
        assert!(Valid.is_redeemable());
        assert!(!Pending.is_redeemable());
        assert!(!Scanned.is_redeemable());
    }
}
