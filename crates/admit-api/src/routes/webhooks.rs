//! # Order Webhook Ingestion
//!
//! The order platform delivers `orders/create` at-least-once; the handler
//! leans on the issuance engine's idempotency, so redeliveries return 200
//! with the already-persisted records counted and nothing re-minted. An
//! order without a buyer email also returns 200 with zero created, which
//! stops the platform from retrying a webhook that can never succeed.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use admit_issuance::{notify_all, OrderEvent};

use crate::error::AppError;
use crate::extractors::ShopDomain;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/webhooks/orders/create", post(orders_create))
}

/// Webhook processing summary.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Records now backing the order's ticket lines (existing + new).
    pub tickets: usize,
    pub skipped_lines: usize,
    pub failed_lines: usize,
    /// Buyer groups delivered to, when auto-notify is on.
    pub notified_groups: usize,
}

/// POST /api/webhooks/orders/create — ingest one order event.
async fn orders_create(
    State(state): State<AppState>,
    ShopDomain(shop): ShopDomain,
    Json(event): Json<OrderEvent>,
) -> Result<Json<WebhookResponse>, AppError> {
    tracing::info!(shop = %shop, order_id = %event.id, "order webhook received");

    let outcome = state.issuance.issue_for_order(&shop, &event).await;

    let notified_groups = if state.config.auto_notify && !outcome.records.is_empty() {
        notify_all(state.notifier.as_ref(), &outcome.records).await
    } else {
        0
    };

    Ok(Json(WebhookResponse {
        tickets: outcome.records.len(),
        skipped_lines: outcome.skipped_lines,
        failed_lines: outcome.failed_lines,
        notified_groups,
    }))
}
