//! # admit-core — Foundational Types for the Admit Stack
//!
//! This crate is the bedrock of the Admit Stack. It defines the type-system
//! primitives shared by every other crate in the workspace: identifier
//! newtypes, the tenant scope, the UTC-only timestamp, the credential status
//! state machine, and the payload/record shapes that flow through issuance
//! and redemption.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `EntryId`, `ShopScope`,
//!    `OrderId`, `LineItemId`, `SealedToken` — no bare strings for
//!    identifiers, so a line-item id can never be passed where an entry id
//!    is expected.
//!
//! 2. **One closed status enumeration.** `CredentialStatus` with a single
//!    transition table (`can_transition`). Legality checks live in one
//!    place, not scattered through callers as string comparisons.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision, so the same instant always serializes to the same
//!    bytes inside a sealed token.
//!
//! 4. **The record is the source of truth.** `CredentialPayload` carries
//!    advisory `valid`/`used` flags for offline pre-checks, but the
//!    admit/deny decision is always made against the `CredentialRecord`
//!    fetched at redemption time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `admit-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod payload;
pub mod record;
pub mod status;
pub mod temporal;

pub use error::CoreError;
pub use identity::{EntryId, LineItemId, OrderId, SealedToken, ShopScope};
pub use payload::CredentialPayload;
pub use record::CredentialRecord;
pub use status::CredentialStatus;
pub use temporal::Timestamp;
