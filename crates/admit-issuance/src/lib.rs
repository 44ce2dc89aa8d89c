//! # admit-issuance — Issuance Engine
//!
//! Turns a purchase event into persisted, sealed, renderable credentials.
//!
//! The upstream order platform delivers webhooks at-least-once, so the
//! engine is built to be invoked repeatedly for the same purchase line
//! without double-minting: the idempotency key is
//! `(shop, order_id, line_item_id)`, and a line that already holds enough
//! records returns them unchanged. A line that holds fewer than `quantity`
//! records — the aftermath of a partial failure — is topped up to quantity,
//! so retries are per-unit idempotent too.
//!
//! Downstream delivery (email fan-out) lives behind the
//! [`DistributionNotifier`] trait and can never fail issuance: once a
//! record is persisted, the credential exists.

pub mod classify;
pub mod engine;
pub mod event;
pub mod notify;

pub use classify::is_ticket_line;
pub use engine::{IssuanceConfig, IssuanceEngine, IssuanceError, IssueRequest, OrderIssuance};
pub use event::{CustomerEvent, DiscountCodeEvent, LineItemEvent, LineItemProperty, OrderEvent};
pub use notify::{
    group_by_buyer, notify_all, DeliveryGroup, DistributionNotifier, LoggingNotifier,
    NotificationError,
};
