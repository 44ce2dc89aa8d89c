//! # Issuance Engine — Purchase Line to Persisted Credentials
//!
//! Per-record flow: fresh `EntryId` → payload (`valid=true, used=false`) →
//! seal → render vector image → persist with status `VALID`.
//!
//! ## Idempotency
//!
//! Issuance is keyed by `(shop, order_id, line_item_id)`. A line that
//! already holds `quantity` records returns them unchanged; a line holding
//! fewer (a prior partial failure) is topped up to `quantity`. Records
//! persisted before a mid-batch failure are never rolled back — the error
//! reports how many exist so the caller can retry, and the retry mints only
//! the shortfall.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use admit_codec::{seal, CodecError, SealKey};
use admit_core::{
    CredentialPayload, CredentialRecord, CredentialStatus, EntryId, LineItemId, OrderId,
    ShopScope, Timestamp,
};
use admit_qr::{render, EncodedImage, ImageFormat, QrError, DEFAULT_SIZE};
use admit_store::{CredentialStore, StoreError};

use crate::classify::{is_ticket_line, DEFAULT_TICKET_TAG};
use crate::event::OrderEvent;

/// Issuance tuning knobs.
#[derive(Debug, Clone)]
pub struct IssuanceConfig {
    /// Tag marking a product as ticket-eligible.
    pub ticket_tag: String,
    /// Edge length of the persisted vector image, in pixels.
    pub image_size: u32,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            ticket_tag: DEFAULT_TICKET_TAG.to_string(),
            image_size: DEFAULT_SIZE,
        }
    }
}

/// Everything needed to mint credentials for one purchase line.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub shop: ShopScope,
    pub order_id: OrderId,
    pub order_name: String,
    pub line_item_id: LineItemId,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub product_title: String,
    pub variant_title: Option<String>,
    pub category_label: String,
    pub quantity: u32,
    pub buyer_email: String,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub affiliate_ref: Option<String>,
    pub unit_price: Option<String>,
}

/// Errors raised while minting credentials.
#[derive(Error, Debug)]
pub enum IssuanceError {
    /// Sealing the payload failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Rendering the credential image failed.
    #[error(transparent)]
    Image(#[from] QrError),

    /// The store rejected a read or write.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Minting stopped mid-batch. `minted` records for this line exist and
    /// remain persisted; a retry tops up the remainder.
    #[error("minted {minted} of {requested} credentials before failing: {cause}")]
    Partial {
        minted: usize,
        requested: u32,
        #[source]
        cause: Box<IssuanceError>,
    },
}

/// Outcome of issuing a whole order event.
#[derive(Debug, Default)]
pub struct OrderIssuance {
    /// Records covering every ticket-eligible line (existing + new).
    pub records: Vec<CredentialRecord>,
    /// Lines skipped by classification.
    pub skipped_lines: usize,
    /// Ticket lines whose issuance failed (logged; others proceed).
    pub failed_lines: usize,
}

type LineKey = (ShopScope, OrderId, LineItemId);

/// The issuance engine.
pub struct IssuanceEngine {
    store: Arc<dyn CredentialStore>,
    key: SealKey,
    config: IssuanceConfig,
    // One lock per purchase line, so a concurrent redelivery cannot pass
    // the existing-count check while another delivery is mid-mint.
    line_locks: Mutex<HashMap<LineKey, Arc<Mutex<()>>>>,
}

impl IssuanceEngine {
    /// Create an engine over a store and seal key.
    pub fn new(store: Arc<dyn CredentialStore>, key: SealKey, config: IssuanceConfig) -> Self {
        Self {
            store,
            key,
            config,
            line_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn line_lock(&self, req: &IssueRequest) -> Arc<Mutex<()>> {
        let key = (
            req.shop.clone(),
            req.order_id.clone(),
            req.line_item_id.clone(),
        );
        self.line_locks.lock().await.entry(key).or_default().clone()
    }

    /// Mint credentials for one purchase line, idempotently.
    ///
    /// Returns every record backing the line: pre-existing ones from
    /// earlier deliveries plus any minted by this call. Concurrent calls
    /// for the same line serialize, so the count check and the mint loop
    /// act as one unit and redeliveries cannot double-mint.
    ///
    /// # Errors
    ///
    /// [`IssuanceError::Partial`] when minting stops mid-batch; records
    /// created before the failure remain persisted.
    pub async fn issue_for_line_item(
        &self,
        req: &IssueRequest,
    ) -> Result<Vec<CredentialRecord>, IssuanceError> {
        let line_lock = self.line_lock(req).await;
        let _line_guard = line_lock.lock().await;

        let requested = req.quantity as usize;
        let mut records = self
            .store
            .find_line_item(&req.shop, &req.order_id, &req.line_item_id)
            .await?;

        if records.len() >= requested {
            tracing::info!(
                shop = %req.shop,
                order_id = %req.order_id,
                line_item_id = %req.line_item_id,
                existing = records.len(),
                "credentials already exist for line item, skipping mint"
            );
            return Ok(records);
        }

        while records.len() < requested {
            match self.mint_one(req).await {
                Ok(record) => records.push(record),
                Err(cause) => {
                    return Err(IssuanceError::Partial {
                        minted: records.len(),
                        requested: req.quantity,
                        cause: Box::new(cause),
                    });
                }
            }
        }

        tracing::info!(
            shop = %req.shop,
            order_id = %req.order_id,
            line_item_id = %req.line_item_id,
            total = records.len(),
            "issued credentials for line item"
        );
        Ok(records)
    }

    /// Mint, seal, render and persist one credential.
    async fn mint_one(&self, req: &IssueRequest) -> Result<CredentialRecord, IssuanceError> {
        let entry_id = EntryId::generate();
        let payload = CredentialPayload::freshly_minted(
            entry_id.clone(),
            req.order_name.clone(),
            req.buyer_email.clone(),
            req.category_label.clone(),
        );

        let sealed_token = seal(&payload, &self.key)?;
        let image = render(&sealed_token, ImageFormat::Vector, Some(self.config.image_size))?;
        let EncodedImage::Svg(qr_svg) = image else {
            // render(Vector) only produces SVG.
            return Err(IssuanceError::Image(QrError::Encode(
                "vector render produced non-vector image".to_string(),
            )));
        };

        let record = CredentialRecord {
            entry_id,
            shop: req.shop.clone(),
            order_id: req.order_id.clone(),
            order_name: req.order_name.clone(),
            line_item_id: req.line_item_id.clone(),
            product_id: req.product_id.clone(),
            variant_id: req.variant_id.clone(),
            product_title: req.product_title.clone(),
            variant_title: req.variant_title.clone(),
            category_label: req.category_label.clone(),
            quantity: 1,
            buyer_email: req.buyer_email.clone(),
            buyer_name: req.buyer_name.clone(),
            buyer_phone: req.buyer_phone.clone(),
            sealed_token,
            qr_svg,
            status: CredentialStatus::Valid,
            created_at: Timestamp::now(),
            redeemed_at: None,
            redeemed_by: None,
            affiliate_ref: req.affiliate_ref.clone(),
            unit_price: req.unit_price.clone(),
        };

        self.store.insert(record.clone()).await?;
        Ok(record)
    }

    /// Process one order event: classify each line, issue the eligible
    /// ones. Per-line failures are logged and do not abort other lines.
    pub async fn issue_for_order(&self, shop: &ShopScope, event: &OrderEvent) -> OrderIssuance {
        let mut outcome = OrderIssuance::default();

        let Some(buyer_email) = event.email.as_deref().filter(|e| !e.is_empty()) else {
            tracing::info!(shop = %shop, order_id = %event.id, "order has no buyer email, skipping");
            outcome.skipped_lines = event.line_items.len();
            return outcome;
        };

        let buyer_name = event.customer.as_ref().and_then(|c| c.display_name());
        let buyer_phone = event.customer.as_ref().and_then(|c| c.phone.clone());
        let affiliate_ref = event.discount_codes.first().map(|d| d.code.clone());

        for line in &event.line_items {
            if !is_ticket_line(line, &self.config.ticket_tag) {
                tracing::debug!(
                    shop = %shop,
                    line_item_id = %line.id,
                    title = %line.title,
                    "line item is not a ticket, skipping"
                );
                outcome.skipped_lines += 1;
                continue;
            }

            let req = IssueRequest {
                shop: shop.clone(),
                order_id: OrderId::new(event.id.clone()),
                order_name: event.name.clone(),
                line_item_id: LineItemId::new(line.id.clone()),
                product_id: line.product_id.clone(),
                variant_id: line.variant_id.clone(),
                product_title: line.title.clone(),
                variant_title: line.variant_title.clone(),
                category_label: line.category_label().to_string(),
                quantity: line.quantity,
                buyer_email: buyer_email.to_string(),
                buyer_name: buyer_name.clone(),
                buyer_phone: buyer_phone.clone(),
                affiliate_ref: affiliate_ref.clone(),
                unit_price: line.price.clone(),
            };

            match self.issue_for_line_item(&req).await {
                Ok(records) => outcome.records.extend(records),
                Err(e) => {
                    tracing::error!(
                        shop = %shop,
                        order_id = %event.id,
                        line_item_id = %line.id,
                        error = %e,
                        "failed to issue credentials for line item"
                    );
                    outcome.failed_lines += 1;
                }
            }
        }

        outcome
    }
}
