//! # admit-redemption — Gate-Side Redemption Engine
//!
//! Decides, exactly once, whether a presented token admits its bearer.
//!
//! ## Security Invariant
//!
//! The engine fails closed in layers. A token that does not unseal is
//! rejected **before any store access** — the store never learns about
//! malformed input, so there is no oracle to probe. A token that unseals
//! names an entry id, and the admit/deny decision is then made solely from
//! the backing record via the store's atomic `VALID → SCANNED` transition.
//! The flags embedded in the payload are advisory for offline pre-checks
//! and are never consulted here.
//!
//! Losing the redemption race is not an error: the loser is told the entry
//! was already used, and by whom. Errors are reserved for infrastructure
//! faults.

pub mod engine;
pub mod outcome;

pub use engine::{RedemptionEngine, RedemptionError, DEFAULT_STORE_TIMEOUT};
pub use outcome::{DenialReason, RedemptionOutcome, TokenCheck, TokenStatus};
