//! # In-Memory Store — Reference Implementation
//!
//! A `parking_lot::RwLock` over a `HashMap`, keyed by `(shop, entry_id)`.
//! Secondary lookups scan; this is the test and single-node backend, not a
//! scale story. What it does guarantee is the contract the trait demands:
//! `redeem_valid` runs entirely under one write lock, so the
//! `VALID → SCANNED` transition is a true compare-and-swap.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use admit_core::status::can_transition;
use admit_core::{
    CredentialRecord, CredentialStatus, EntryId, LineItemId, OrderId, ShopScope, Timestamp,
};

use crate::{CredentialStore, ListQuery, Page, RedeemAttempt, StoreError};

type Key = (ShopScope, EntryId);

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Key, CredentialRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total record count across all tenants (test helper).
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Snapshot of one shop's records, newest first.
    fn scan_shop(&self, shop: &ShopScope) -> Vec<CredentialRecord> {
        let mut records: Vec<CredentialRecord> = self
            .records
            .read()
            .iter()
            .filter(|((s, _), _)| s == shop)
            .map(|(_, r)| r.clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.entry_id.0.cmp(&a.entry_id.0)));
        records
    }
}

/// Apply status and date filters + pagination to a newest-first snapshot.
fn paginate(records: Vec<CredentialRecord>, query: &ListQuery) -> Page<CredentialRecord> {
    let filtered: Vec<CredentialRecord> = records
        .into_iter()
        .filter(|r| query.status.map_or(true, |s| r.status == s))
        .filter(|r| query.created_from.map_or(true, |from| r.created_at >= from))
        .filter(|r| query.created_to.map_or(true, |to| r.created_at <= to))
        .collect();
    let total = filtered.len();
    let items = filtered
        .into_iter()
        .skip(query.effective_offset())
        .take(query.effective_limit())
        .collect();
    Page { items, total }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError> {
        let key = (record.shop.clone(), record.entry_id.clone());
        let mut records = self.records.write();
        if records.contains_key(&key) {
            return Err(StoreError::Duplicate(record.entry_id));
        }
        records.insert(key, record);
        Ok(())
    }

    async fn get(
        &self,
        shop: &ShopScope,
        entry_id: &EntryId,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .get(&(shop.clone(), entry_id.clone()))
            .cloned())
    }

    async fn find_line_item(
        &self,
        shop: &ShopScope,
        order_id: &OrderId,
        line_item_id: &LineItemId,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        Ok(self
            .scan_shop(shop)
            .into_iter()
            .filter(|r| &r.order_id == order_id && &r.line_item_id == line_item_id)
            .collect())
    }

    async fn find_order(
        &self,
        shop: &ShopScope,
        order_ref: &OrderId,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        Ok(self
            .scan_shop(shop)
            .into_iter()
            .filter(|r| &r.order_id == order_ref || r.order_name == order_ref.as_str())
            .collect())
    }

    async fn list(
        &self,
        shop: &ShopScope,
        query: &ListQuery,
    ) -> Result<Page<CredentialRecord>, StoreError> {
        Ok(paginate(self.scan_shop(shop), query))
    }

    async fn search_buyer(
        &self,
        shop: &ShopScope,
        needle: &str,
        query: &ListQuery,
    ) -> Result<Page<CredentialRecord>, StoreError> {
        let needle = needle.to_lowercase();
        let matches = self
            .scan_shop(shop)
            .into_iter()
            .filter(|r| {
                r.buyer_email.to_lowercase().contains(&needle)
                    || r.buyer_name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .collect();
        Ok(paginate(matches, query))
    }

    async fn redeem_valid(
        &self,
        shop: &ShopScope,
        entry_id: &EntryId,
        redeemed_by: &str,
        at: Timestamp,
    ) -> Result<RedeemAttempt, StoreError> {
        // Single write lock for the whole check-and-set: this is the CAS.
        let mut records = self.records.write();
        let Some(record) = records.get_mut(&(shop.clone(), entry_id.clone())) else {
            return Ok(RedeemAttempt::NotFound);
        };

        match record.status {
            CredentialStatus::Valid => {
                record.status = CredentialStatus::Scanned;
                record.redeemed_at = Some(at);
                record.redeemed_by = Some(redeemed_by.to_string());
                Ok(RedeemAttempt::Redeemed(record.clone()))
            }
            CredentialStatus::Scanned => Ok(RedeemAttempt::AlreadyScanned(record.clone())),
            CredentialStatus::Pending
            | CredentialStatus::Invalid
            | CredentialStatus::Cancelled => Ok(RedeemAttempt::Invalidated(record.clone())),
        }
    }

    async fn set_status(
        &self,
        shop: &ShopScope,
        entry_id: &EntryId,
        to: CredentialStatus,
    ) -> Result<CredentialRecord, StoreError> {
        let mut records = self.records.write();
        let Some(record) = records.get_mut(&(shop.clone(), entry_id.clone())) else {
            return Err(StoreError::NotFound(entry_id.clone()));
        };
        if !can_transition(record.status, to) {
            return Err(StoreError::InvalidTransition {
                entry_id: entry_id.clone(),
                from: record.status,
                to,
            });
        }
        record.status = to;
        Ok(record.clone())
    }
}
