//! # admit-api — Axum HTTP Surface for the Admit Stack
//!
//! ## API Surface
//!
//! | Route                                 | Module               | Domain              |
//! |---------------------------------------|----------------------|---------------------|
//! | `POST /api/webhooks/orders/create`    | [`routes::webhooks`] | Order ingestion     |
//! | `POST /api/tickets/validate`          | [`routes::tickets`]  | Gate redemption     |
//! | `GET  /api/tickets/validate`          | [`routes::tickets`]  | Non-mutating check  |
//! | `GET  /api/tickets`                   | [`routes::tickets`]  | List                |
//! | `GET  /api/tickets/search`            | [`routes::tickets`]  | Buyer search        |
//! | `GET  /api/tickets/by-order/{id}`     | [`routes::tickets`]  | Per-order lookup    |
//! | `GET  /api/tickets/export.csv`        | [`routes::tickets`]  | CSV export          |
//! | `PUT  /api/tickets/{id}/status`       | [`routes::tickets`]  | Administration      |
//! | `GET  /api/qr/{id}`                   | [`routes::images`]   | Image delivery      |
//! | `GET  /health/*`                      | this module          | Probes              |
//!
//! Every tenant route reads its shop scope from the `X-Shop-Domain`
//! header; health probes are the only unscoped routes.

pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use admit_core::ShopScope;
use admit_store::ListQuery;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::webhooks::router())
        .merge(routes::tickets::router())
        .merge(routes::images::router());

    let probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new()
        .merge(probes)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe — 200 whenever the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the store answers a trivial query.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let probe = ShopScope::new("readiness-probe");
    match state.store.list(&probe, &ListQuery::default()).await {
        Ok(_) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unreachable").into_response()
        }
    }
}
