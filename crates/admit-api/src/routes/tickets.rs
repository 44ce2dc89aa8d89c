//! # Ticket Query & Validation API
//!
//! Gate-side validation (mutating and check-only) plus the back-office
//! query surface: list, buyer search, per-order lookup, CSV export and
//! administrative status changes.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use admit_core::{CredentialRecord, CredentialStatus, EntryId, OrderId, SealedToken, Timestamp};
use admit_store::{to_csv, ListQuery, Page};

use crate::error::AppError;
use crate::extractors::ShopDomain;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tickets", get(list_tickets))
        .route("/api/tickets/validate", post(validate).get(check))
        .route("/api/tickets/search", get(search_tickets))
        .route("/api/tickets/by-order/{order_id}", get(tickets_by_order))
        .route("/api/tickets/export.csv", get(export_csv))
        .route("/api/tickets/{entry_id}/status", put(set_status))
}

// ---- validation ----

/// Body of a mutating validation scan.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub token: String,
    /// Operator or device performing the scan.
    pub redeemed_by: String,
}

/// POST /api/tickets/validate — redeem a presented token, exactly once.
async fn validate(
    State(state): State<AppState>,
    ShopDomain(shop): ShopDomain,
    Json(req): Json<ValidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.redeemed_by.trim().is_empty() {
        return Err(AppError::Validation("redeemed_by must be non-empty".to_string()));
    }

    let token = SealedToken::new(req.token);
    let outcome = state
        .redemption
        .redeem(&shop, &token, req.redeemed_by.trim())
        .await?;
    Ok(Json(outcome))
}

/// Query string of the non-mutating check.
#[derive(Debug, Deserialize)]
pub struct CheckParams {
    pub token: String,
}

/// GET /api/tickets/validate?token= — status check without redeeming.
async fn check(
    State(state): State<AppState>,
    ShopDomain(shop): ShopDomain,
    Query(params): Query<CheckParams>,
) -> Result<impl IntoResponse, AppError> {
    let token = SealedToken::new(params.token);
    let check = state.redemption.check(&shop, &token).await?;
    Ok(Json(check))
}

// ---- queries ----

/// Query string shared by list/search/export.
#[derive(Debug, Default, Deserialize)]
pub struct TicketListParams {
    pub status: Option<String>,
    /// RFC 3339 lower bound on creation time (inclusive).
    pub created_from: Option<String>,
    /// RFC 3339 upper bound on creation time (inclusive).
    pub created_to: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Buyer substring, search route only.
    pub q: Option<String>,
}

fn parse_bound(value: Option<&str>, param: &str) -> Result<Option<Timestamp>, AppError> {
    value
        .map(|s| {
            Timestamp::parse_lenient(s)
                .map_err(|_| AppError::Validation(format!("invalid {param} timestamp '{s}'")))
        })
        .transpose()
}

impl TicketListParams {
    fn to_query(&self) -> Result<ListQuery, AppError> {
        let status = match self.status.as_deref() {
            Some(s) => Some(CredentialStatus::from_str(s).map_err(|_| {
                AppError::Validation(format!("unknown status filter '{s}'"))
            })?),
            None => None,
        };
        Ok(ListQuery {
            status,
            created_from: parse_bound(self.created_from.as_deref(), "created_from")?,
            created_to: parse_bound(self.created_to.as_deref(), "created_to")?,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

/// GET /api/tickets — newest first, with status filter and pagination.
async fn list_tickets(
    State(state): State<AppState>,
    ShopDomain(shop): ShopDomain,
    Query(params): Query<TicketListParams>,
) -> Result<Json<Page<CredentialRecord>>, AppError> {
    let query = params.to_query()?;
    let page = state.store.list(&shop, &query).await?;
    Ok(Json(page))
}

/// GET /api/tickets/search?q= — buyer email/name substring search.
async fn search_tickets(
    State(state): State<AppState>,
    ShopDomain(shop): ShopDomain,
    Query(params): Query<TicketListParams>,
) -> Result<Json<Page<CredentialRecord>>, AppError> {
    let needle = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("query parameter q is required".to_string()))?;

    let query = params.to_query()?;
    let page = state.store.search_buyer(&shop, needle, &query).await?;
    Ok(Json(page))
}

/// GET /api/tickets/by-order/{order_id} — all records for one order.
///
/// The path segment matches either the platform order id or the order
/// name (`#1001`); storefront order-status surfaces only know the name.
async fn tickets_by_order(
    State(state): State<AppState>,
    ShopDomain(shop): ShopDomain,
    Path(order_ref): Path<String>,
) -> Result<Json<Vec<CredentialRecord>>, AppError> {
    let records = state
        .store
        .find_order(&shop, &OrderId::new(order_ref))
        .await?;
    Ok(Json(records))
}

/// GET /api/tickets/export.csv — spreadsheet export.
///
/// Pagination parameters are ignored: the export always covers every
/// matching record.
async fn export_csv(
    State(state): State<AppState>,
    ShopDomain(shop): ShopDomain,
    Query(params): Query<TicketListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListQuery {
        limit: Some(usize::MAX),
        offset: Some(0),
        ..params.to_query()?
    };
    let page = state.store.list(&shop, &query).await?;
    let csv = to_csv(&page.items);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"tickets.csv\"",
            ),
        ],
        csv,
    ))
}

// ---- administration ----

/// Body of an administrative status change.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// Record wrapper for single-record responses.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub ticket: CredentialRecord,
}

/// PUT /api/tickets/{entry_id}/status — activate, invalidate or cancel.
///
/// Transitions are checked against the status machine; an illegal move is
/// a 409.
async fn set_status(
    State(state): State<AppState>,
    ShopDomain(shop): ShopDomain,
    Path(entry_id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<TicketResponse>, AppError> {
    let to = CredentialStatus::from_str(&req.status)
        .map_err(|_| AppError::Validation(format!("unknown status '{}'", req.status)))?;

    let record = state
        .store
        .set_status(&shop, &EntryId::new(entry_id), to)
        .await?;
    Ok(Json(TicketResponse { ticket: record }))
}
