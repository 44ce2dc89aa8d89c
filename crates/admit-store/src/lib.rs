//! # admit-store — Abstract Keyed Store
//!
//! The backing store is the single shared mutable resource in the whole
//! stack. This crate defines its contract — [`CredentialStore`] — and ships
//! an in-memory reference implementation used by tests and single-node
//! deployments. Persistence engine internals are deliberately behind the
//! trait: issuance and redemption do not know or care what is underneath.
//!
//! ## The One Contract That Matters
//!
//! [`CredentialStore::redeem_valid`] performs the `VALID → SCANNED`
//! transition as a single atomic conditional update. Under concurrent
//! redemption of the same entry, exactly one caller observes
//! [`RedeemAttempt::Redeemed`]; every other caller observes the
//! already-scanned record. Implementations must never do read-then-write
//! without isolation here.
//!
//! ## Tenant Isolation
//!
//! Every lookup is keyed by [`ShopScope`]. A record minted under one shop
//! does not exist as far as any other shop's queries are concerned.

pub mod export;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use admit_core::{
    CredentialRecord, CredentialStatus, EntryId, LineItemId, OrderId, ShopScope, Timestamp,
};

pub use export::to_csv;
pub use memory::MemoryStore;

/// Default page size for list/search queries.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Infrastructure-level store failures.
///
/// Expected outcomes (not found, lost the redemption race) are modeled in
/// return types, not errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or the operation did not complete.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A record with this entry id already exists.
    #[error("duplicate entry id: {0}")]
    Duplicate(EntryId),

    /// An administrative status change violated the transition table.
    #[error("invalid status transition {from} -> {to} for {entry_id}")]
    InvalidTransition {
        entry_id: EntryId,
        from: CredentialStatus,
        to: CredentialStatus,
    },

    /// The record does not exist under this tenant scope.
    #[error("no record for entry id {0}")]
    NotFound(EntryId),
}

/// Result of one atomic redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemAttempt {
    /// This caller won the transition; the record reflects the new state.
    Redeemed(CredentialRecord),
    /// The record was already `SCANNED` — by an earlier scan or by a
    /// concurrent caller that won the race. Carries the recorded
    /// redemption metadata.
    AlreadyScanned(CredentialRecord),
    /// The record is `INVALID` or `CANCELLED` (or still `PENDING`);
    /// redemption is not possible.
    Invalidated(CredentialRecord),
    /// No record under this entry id and tenant scope.
    NotFound,
}

/// Status and date filters plus pagination for list/search queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Restrict to one status; `None` means all.
    pub status: Option<CredentialStatus>,
    /// Keep records created at or after this instant.
    pub created_from: Option<Timestamp>,
    /// Keep records created at or before this instant.
    pub created_to: Option<Timestamp>,
    /// Page size; `None` means [`DEFAULT_PAGE_LIMIT`].
    pub limit: Option<usize>,
    /// Offset into the newest-first ordering.
    pub offset: Option<usize>,
}

impl ListQuery {
    /// Effective page size.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    /// Effective offset.
    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// One page of query results with the pre-pagination total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// The abstract keyed store behind issuance, redemption and the query
/// surface.
///
/// Indexes implied by the contract: primary key `entry_id`;
/// `(shop, order_id, line_item_id)` for idempotency lookups;
/// `(shop, buyer_email)` for search.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a freshly minted record.
    ///
    /// # Errors
    ///
    /// [`StoreError::Duplicate`] when the entry id already exists.
    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError>;

    /// Fetch one record by entry id under a tenant scope.
    async fn get(
        &self,
        shop: &ShopScope,
        entry_id: &EntryId,
    ) -> Result<Option<CredentialRecord>, StoreError>;

    /// All records for one purchase line — the issuance idempotency
    /// lookup.
    async fn find_line_item(
        &self,
        shop: &ShopScope,
        order_id: &OrderId,
        line_item_id: &LineItemId,
    ) -> Result<Vec<CredentialRecord>, StoreError>;

    /// All records for one order, newest first. The reference matches
    /// either the platform order id or the human-readable order name
    /// (e.g. `#1001`) — storefront surfaces often only know the latter.
    async fn find_order(
        &self,
        shop: &ShopScope,
        order_ref: &OrderId,
    ) -> Result<Vec<CredentialRecord>, StoreError>;

    /// List records for a shop, newest first, with status filter and
    /// pagination.
    async fn list(
        &self,
        shop: &ShopScope,
        query: &ListQuery,
    ) -> Result<Page<CredentialRecord>, StoreError>;

    /// Case-insensitive substring search over buyer email and name.
    async fn search_buyer(
        &self,
        shop: &ShopScope,
        needle: &str,
        query: &ListQuery,
    ) -> Result<Page<CredentialRecord>, StoreError>;

    /// Atomically transition `VALID → SCANNED`, recording who redeemed and
    /// when. The compare-and-swap semantics of this method are the
    /// exactly-once guarantee of the whole system.
    async fn redeem_valid(
        &self,
        shop: &ShopScope,
        entry_id: &EntryId,
        redeemed_by: &str,
        at: Timestamp,
    ) -> Result<RedeemAttempt, StoreError>;

    /// Administrative status change (`Pending→Valid`, `Valid→Invalid`,
    /// `Valid→Cancelled`), checked against the transition table.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] for unknown entries,
    /// [`StoreError::InvalidTransition`] for illegal moves.
    async fn set_status(
        &self,
        shop: &ShopScope,
        entry_id: &EntryId,
        to: CredentialStatus,
    ) -> Result<CredentialRecord, StoreError>;
}
