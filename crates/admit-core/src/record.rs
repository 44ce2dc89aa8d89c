//! # Credential Record — The Source of Truth
//!
//! One persisted record per admission right. Created once at issuance and
//! never physically deleted; mutated only by the redemption engine (status,
//! `redeemed_at`, `redeemed_by`) or administratively (invalidation,
//! cancellation).
//!
//! A multi-quantity purchase line fans out into N records, each with
//! `quantity == 1` and its own sealed token and rendered image.

use serde::{Deserialize, Serialize};

use crate::identity::{EntryId, LineItemId, OrderId, SealedToken, ShopScope};
use crate::status::CredentialStatus;
use crate::temporal::Timestamp;

/// The persisted credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    // -- Identity --
    /// Primary key; equals the `entry_id` sealed inside the token.
    pub entry_id: EntryId,
    /// Tenant partition. Cross-tenant lookups must never resolve.
    pub shop: ShopScope,
    /// Platform order id (authoritative).
    pub order_id: OrderId,
    /// Human-readable order name (e.g. `#1001`).
    pub order_name: String,
    /// Platform line-item id; part of the issuance idempotency key.
    pub line_item_id: LineItemId,

    // -- Descriptive --
    /// Platform product id, when the event carried one.
    pub product_id: Option<String>,
    /// Platform variant id, when the event carried one.
    pub variant_id: Option<String>,
    /// Product title at time of purchase.
    pub product_title: String,
    /// Variant title at time of purchase.
    pub variant_title: Option<String>,
    /// Ticket class/type label.
    pub category_label: String,
    /// Always 1 — multi-quantity lines fan out into N records.
    pub quantity: u32,

    // -- Buyer --
    pub buyer_email: String,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,

    // -- Credential artifacts --
    /// Ciphertext string embedded in the scannable image.
    pub sealed_token: SealedToken,
    /// Vector rendering of the sealed token (SVG markup). Immutable after
    /// issuance; the raster form is derived on demand.
    pub qr_svg: String,

    // -- Status --
    pub status: CredentialStatus,
    pub created_at: Timestamp,
    pub redeemed_at: Option<Timestamp>,
    /// Operator or device that performed the redemption.
    pub redeemed_by: Option<String>,

    // -- Commerce attribution --
    /// Affiliate/discount attribution, when present on the order.
    pub affiliate_ref: Option<String>,
    /// Unit price as a decimal string. Never a float.
    pub unit_price: Option<String>,
}

impl CredentialRecord {
    /// Whether this record may still be redeemed.
    pub fn is_redeemable(&self) -> bool {
        self.status.is_redeemable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CredentialRecord {
        CredentialRecord {
            entry_id: EntryId("TKT-ABC-1234567".to_string()),
            shop: ShopScope::new("demo.myshopify.com"),
            order_id: OrderId::new("900001"),
            order_name: "#1001".to_string(),
            line_item_id: LineItemId::new("li-1"),
            product_id: Some("p-1".to_string()),
            variant_id: None,
            product_title: "Concert Ticket".to_string(),
            variant_title: None,
            category_label: "General Admission".to_string(),
            quantity: 1,
            buyer_email: "buyer@example.com".to_string(),
            buyer_name: Some("Ada Lovelace".to_string()),
            buyer_phone: None,
            sealed_token: SealedToken::new("opaque"),
            qr_svg: "<svg/>".to_string(),
            status: CredentialStatus::Valid,
            created_at: Timestamp::parse("2026-01-15T12:00:00Z").unwrap(),
            redeemed_at: None,
            redeemed_by: None,
            affiliate_ref: None,
            unit_price: Some("25.00".to_string()),
        }
    }

    #[test]
    fn test_redeemable_follows_status() {
        let mut r = record();
        assert!(r.is_redeemable());
        r.status = CredentialStatus::Scanned;
        assert!(!r.is_redeemable());
    }

    #[test]
    fn test_serde_roundtrip() {
        let r = record();
        let json = serde_json::to_string(&r).unwrap();
        let back: CredentialRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
