//! # Redemption Engine
//!
//! Unseal, then a single atomic store transition, then outcome mapping.
//! The store call runs under a short timeout; an elapsed timeout is
//! ambiguous (the write may or may not have landed), so the engine
//! re-queries the record and reports what it finds rather than guessing.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use admit_codec::{unseal, SealKey};
use admit_core::{CredentialRecord, CredentialStatus, SealedToken, ShopScope, Timestamp};
use admit_store::{CredentialStore, RedeemAttempt, StoreError};

use crate::outcome::{DenialReason, RedemptionOutcome, TokenCheck, TokenStatus};

/// Default ceiling on the atomic redemption write.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Infrastructure failures during redemption. Denials are outcomes, not
/// errors.
#[derive(Error, Debug)]
pub enum RedemptionError {
    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The atomic write timed out and the follow-up query still shows the
    /// record `VALID`. The write did not land; the operator should retry.
    #[error("store timed out during redemption; entry is still redeemable, retry the scan")]
    StoreTimeout,
}

/// The redemption engine.
pub struct RedemptionEngine {
    store: Arc<dyn CredentialStore>,
    key: SealKey,
    store_timeout: Duration,
}

impl RedemptionEngine {
    /// Create an engine over a store and seal key.
    pub fn new(store: Arc<dyn CredentialStore>, key: SealKey, store_timeout: Duration) -> Self {
        Self {
            store,
            key,
            store_timeout,
        }
    }

    /// Attempt to redeem a presented token, exactly once.
    ///
    /// A token that fails to unseal is denied without any store access.
    ///
    /// # Errors
    ///
    /// [`RedemptionError::StoreTimeout`] when the write timed out and the
    /// entry is confirmed still redeemable; [`RedemptionError::Store`] for
    /// other store faults.
    pub async fn redeem(
        &self,
        shop: &ShopScope,
        token: &SealedToken,
        redeemed_by: &str,
    ) -> Result<RedemptionOutcome, RedemptionError> {
        let payload = match unseal(token, &self.key) {
            Ok(payload) => payload,
            Err(_) => {
                tracing::warn!(shop = %shop, "rejected token that failed to unseal");
                return Ok(RedemptionOutcome::Invalid {
                    reason: DenialReason::CorruptOrTampered,
                });
            }
        };

        let entry_id = payload.entry_id;
        let attempt = tokio::time::timeout(
            self.store_timeout,
            self.store
                .redeem_valid(shop, &entry_id, redeemed_by, Timestamp::now()),
        )
        .await;

        let attempt = match attempt {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    shop = %shop,
                    entry_id = %entry_id,
                    "redemption write timed out, re-querying record state"
                );
                return self.resolve_after_timeout(shop, &entry_id, redeemed_by).await;
            }
        };

        Ok(Self::map_attempt(shop, attempt))
    }

    fn map_attempt(shop: &ShopScope, attempt: RedeemAttempt) -> RedemptionOutcome {
        match attempt {
            RedeemAttempt::Redeemed(record) => {
                tracing::info!(shop = %shop, entry_id = %record.entry_id, "entry admitted");
                RedemptionOutcome::Admitted { record }
            }
            RedeemAttempt::AlreadyScanned(record) => {
                tracing::info!(shop = %shop, entry_id = %record.entry_id, "entry already used");
                Self::already_used(record)
            }
            RedeemAttempt::Invalidated(record) => {
                tracing::info!(
                    shop = %shop,
                    entry_id = %record.entry_id,
                    status = %record.status,
                    "entry denied by status"
                );
                RedemptionOutcome::Invalid {
                    reason: DenialReason::EntryInvalidated,
                }
            }
            RedeemAttempt::NotFound => RedemptionOutcome::Invalid {
                reason: DenialReason::UnknownEntry,
            },
        }
    }

    fn already_used(record: CredentialRecord) -> RedemptionOutcome {
        let redeemed_at = record.redeemed_at;
        let redeemed_by = record.redeemed_by.clone();
        RedemptionOutcome::AlreadyUsed {
            record,
            redeemed_at,
            redeemed_by,
        }
    }

    /// The write timed out, so its fate is unknown. Read the record back
    /// and classify from what actually landed.
    async fn resolve_after_timeout(
        &self,
        shop: &ShopScope,
        entry_id: &admit_core::EntryId,
        redeemed_by: &str,
    ) -> Result<RedemptionOutcome, RedemptionError> {
        let record = match self.store.get(shop, entry_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return Ok(RedemptionOutcome::Invalid {
                    reason: DenialReason::UnknownEntry,
                })
            }
            Err(_) => return Err(RedemptionError::StoreTimeout),
        };

        match record.status {
            CredentialStatus::Scanned => {
                // Scanned by this operator means our write landed.
                if record.redeemed_by.as_deref() == Some(redeemed_by) {
                    Ok(RedemptionOutcome::Admitted { record })
                } else {
                    Ok(Self::already_used(record))
                }
            }
            CredentialStatus::Valid => Err(RedemptionError::StoreTimeout),
            _ => Ok(RedemptionOutcome::Invalid {
                reason: DenialReason::EntryInvalidated,
            }),
        }
    }

    /// Non-mutating status check: same fail-closed mapping, no transition.
    ///
    /// # Errors
    ///
    /// [`RedemptionError::Store`] when the lookup fails.
    pub async fn check(
        &self,
        shop: &ShopScope,
        token: &SealedToken,
    ) -> Result<TokenCheck, RedemptionError> {
        let payload = match unseal(token, &self.key) {
            Ok(payload) => payload,
            Err(_) => return Ok(TokenCheck::denied(DenialReason::CorruptOrTampered)),
        };

        let record = match self.store.get(shop, &payload.entry_id).await? {
            Some(record) => record,
            None => return Ok(TokenCheck::denied(DenialReason::UnknownEntry)),
        };

        Ok(match record.status {
            CredentialStatus::Valid => TokenCheck {
                status: TokenStatus::Redeemable,
                reason: None,
                record: Some(record),
            },
            CredentialStatus::Scanned => TokenCheck {
                status: TokenStatus::AlreadyUsed,
                reason: None,
                record: Some(record),
            },
            _ => TokenCheck {
                status: TokenStatus::Invalid,
                reason: Some(DenialReason::EntryInvalidated),
                record: Some(record),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use admit_codec::seal;
    use admit_core::{CredentialPayload, EntryId, LineItemId, OrderId};
    use admit_store::{ListQuery, MemoryStore, Page};

    fn key() -> SealKey {
        SealKey::from_bytes([7u8; 32])
    }

    fn shop() -> ShopScope {
        ShopScope::new("demo.myshopify.com")
    }

    fn sealed_record(entry: &str) -> (CredentialRecord, SealedToken) {
        let entry_id = EntryId::new(entry);
        let payload = CredentialPayload::freshly_minted(
            entry_id.clone(),
            "#1001",
            "buyer@example.com",
            "General Admission",
        );
        let token = seal(&payload, &key()).unwrap();
        let record = CredentialRecord {
            entry_id,
            shop: shop(),
            order_id: OrderId::new("1"),
            order_name: "#1001".to_string(),
            line_item_id: LineItemId::new("li-1"),
            product_id: None,
            variant_id: None,
            product_title: "Concert Ticket".to_string(),
            variant_title: None,
            category_label: "General Admission".to_string(),
            quantity: 1,
            buyer_email: "buyer@example.com".to_string(),
            buyer_name: None,
            buyer_phone: None,
            sealed_token: token.clone(),
            qr_svg: "<svg/>".to_string(),
            status: CredentialStatus::Valid,
            created_at: Timestamp::now(),
            redeemed_at: None,
            redeemed_by: None,
            affiliate_ref: None,
            unit_price: None,
        };
        (record, token)
    }

    async fn engine_with(record: CredentialRecord) -> (RedemptionEngine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.insert(record).await.unwrap();
        let engine = RedemptionEngine::new(store.clone(), key(), DEFAULT_STORE_TIMEOUT);
        (engine, store)
    }

    // ---- admit & double redeem ----

    #[tokio::test]
    async fn test_valid_token_admits_once() {
        let (record, token) = sealed_record("TKT-A-1111111");
        let (engine, store) = engine_with(record).await;

        let first = engine.redeem(&shop(), &token, "gate-1").await.unwrap();
        let RedemptionOutcome::Admitted { record } = first else {
            panic!("expected admission");
        };
        assert_eq!(record.status, CredentialStatus::Scanned);
        assert_eq!(record.redeemed_by.as_deref(), Some("gate-1"));

        let second = engine.redeem(&shop(), &token, "gate-2").await.unwrap();
        let RedemptionOutcome::AlreadyUsed { redeemed_at, redeemed_by, .. } = second else {
            panic!("expected already-used");
        };
        assert_eq!(redeemed_at, record.redeemed_at);
        assert_eq!(redeemed_by.as_deref(), Some("gate-1"));

        let stored = store.get(&shop(), &record.entry_id).await.unwrap().unwrap();
        assert_eq!(stored.status, CredentialStatus::Scanned);
    }

    // ---- fail closed before the store ----

    /// Store double that counts every call.
    struct SpyStore {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl CredentialStore for SpyStore {
        async fn insert(&self, _: CredentialRecord) -> Result<(), StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn get(&self, _: &ShopScope, _: &EntryId) -> Result<Option<CredentialRecord>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
        async fn find_line_item(&self, _: &ShopScope, _: &OrderId, _: &LineItemId) -> Result<Vec<CredentialRecord>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn find_order(&self, _: &ShopScope, _: &OrderId) -> Result<Vec<CredentialRecord>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn list(&self, _: &ShopScope, _: &ListQuery) -> Result<Page<CredentialRecord>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(Page { items: Vec::new(), total: 0 })
        }
        async fn search_buyer(&self, _: &ShopScope, _: &str, _: &ListQuery) -> Result<Page<CredentialRecord>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(Page { items: Vec::new(), total: 0 })
        }
        async fn redeem_valid(&self, _: &ShopScope, _: &EntryId, _: &str, _: Timestamp) -> Result<RedeemAttempt, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(RedeemAttempt::NotFound)
        }
        async fn set_status(&self, _: &ShopScope, entry_id: &EntryId, _: CredentialStatus) -> Result<CredentialRecord, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::NotFound(entry_id.clone()))
        }
    }

    #[tokio::test]
    async fn test_corrupt_token_never_reaches_store() {
        let store = Arc::new(SpyStore { lookups: AtomicUsize::new(0) });
        let engine = RedemptionEngine::new(store.clone(), key(), DEFAULT_STORE_TIMEOUT);

        let (_, token) = sealed_record("TKT-A-2222222");
        let truncated = SealedToken::new(&token.as_str()[..token.as_str().len() - 10]);

        let outcome = engine.redeem(&shop(), &truncated, "gate-1").await.unwrap();
        assert_eq!(
            outcome,
            RedemptionOutcome::Invalid { reason: DenialReason::CorruptOrTampered }
        );
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);

        let garbage = SealedToken::new("not-a-token");
        let check = engine.check(&shop(), &garbage).await.unwrap();
        assert_eq!(check.status, TokenStatus::Invalid);
        assert_eq!(check.reason, Some(DenialReason::CorruptOrTampered));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    // ---- status precedence ----

    #[tokio::test]
    async fn test_invalidated_record_denied_with_wellformed_token() {
        let (mut record, token) = sealed_record("TKT-A-3333333");
        record.status = CredentialStatus::Invalid;
        let (engine, store) = engine_with(record.clone()).await;

        let outcome = engine.redeem(&shop(), &token, "gate-1").await.unwrap();
        assert_eq!(
            outcome,
            RedemptionOutcome::Invalid { reason: DenialReason::EntryInvalidated }
        );
        let stored = store.get(&shop(), &record.entry_id).await.unwrap().unwrap();
        assert_eq!(stored.status, CredentialStatus::Invalid);
    }

    #[tokio::test]
    async fn test_cancelled_record_denied() {
        let (mut record, token) = sealed_record("TKT-A-4444444");
        record.status = CredentialStatus::Cancelled;
        let (engine, _) = engine_with(record).await;

        let outcome = engine.redeem(&shop(), &token, "gate-1").await.unwrap();
        assert_eq!(
            outcome,
            RedemptionOutcome::Invalid { reason: DenialReason::EntryInvalidated }
        );
    }

    #[tokio::test]
    async fn test_unknown_entry_denied() {
        let store = Arc::new(MemoryStore::new());
        let engine = RedemptionEngine::new(store, key(), DEFAULT_STORE_TIMEOUT);

        // Well-formed token, but nothing was ever persisted for it.
        let (_, token) = sealed_record("TKT-A-5555555");
        let outcome = engine.redeem(&shop(), &token, "gate-1").await.unwrap();
        assert_eq!(
            outcome,
            RedemptionOutcome::Invalid { reason: DenialReason::UnknownEntry }
        );
    }

    // ---- payload flags are advisory only ----

    #[tokio::test]
    async fn test_embedded_flags_do_not_drive_decision() {
        let entry_id = EntryId::new("TKT-A-6666666");
        let mut payload = CredentialPayload::freshly_minted(
            entry_id.clone(),
            "#1001",
            "buyer@example.com",
            "General Admission",
        );
        payload.valid = false;
        payload.used = true;
        let token = seal(&payload, &key()).unwrap();

        let (mut record, _) = sealed_record("TKT-A-6666666");
        record.sealed_token = token.clone();
        let (engine, _) = engine_with(record).await;

        // Record is VALID, so the lying flags are ignored and entry admits.
        let outcome = engine.redeem(&shop(), &token, "gate-1").await.unwrap();
        assert!(matches!(outcome, RedemptionOutcome::Admitted { .. }));
    }

    // ---- non-mutating check ----

    #[tokio::test]
    async fn test_check_does_not_mutate() {
        let (record, token) = sealed_record("TKT-A-7777777");
        let (engine, store) = engine_with(record.clone()).await;

        let check = engine.check(&shop(), &token).await.unwrap();
        assert_eq!(check.status, TokenStatus::Redeemable);

        let stored = store.get(&shop(), &record.entry_id).await.unwrap().unwrap();
        assert_eq!(stored.status, CredentialStatus::Valid);

        engine.redeem(&shop(), &token, "gate-1").await.unwrap();
        let check = engine.check(&shop(), &token).await.unwrap();
        assert_eq!(check.status, TokenStatus::AlreadyUsed);
    }
}
