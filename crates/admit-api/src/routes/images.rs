//! # Scannable Image Delivery
//!
//! Serves the credential image for embedding in storefronts and emails.
//! A credential's image never changes once minted, so responses carry an
//! immutable cache policy, and the route is CORS-permissive for cross-
//! origin `<img>` use. Tenant scope still applies: the image of another
//! shop's entry is a 404.
//!
//! The persisted artifact is the vector form. Vector responses are served
//! from it (resized without re-encoding); raster responses are rendered on
//! demand from the stored token.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use admit_core::EntryId;
use admit_qr::{render, resize, EncodedImage, ImageFormat};

use crate::error::AppError;
use crate::extractors::ShopDomain;
use crate::state::AppState;

/// One year, immutable.
const CACHE_POLICY: &str = "public, max-age=31536000, immutable";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/qr/{entry_id}", get(qr_image))
        .layer(CorsLayer::permissive())
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
    /// Target edge length in pixels; defaults to the minted size.
    pub size: Option<u32>,
    /// `svg` (default) or `png`.
    pub format: Option<String>,
}

/// GET /api/qr/{entry_id}?size=&format= — the credential's image bytes.
async fn qr_image(
    State(state): State<AppState>,
    ShopDomain(shop): ShopDomain,
    Path(entry_id): Path<String>,
    Query(params): Query<ImageParams>,
) -> Result<impl IntoResponse, AppError> {
    let format = match params.format.as_deref() {
        None | Some("svg") => ImageFormat::Vector,
        Some("png") => ImageFormat::Raster,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "unknown image format '{other}', expected svg or png"
            )))
        }
    };

    let entry_id = EntryId::new(entry_id);
    let record = state
        .store
        .get(&shop, &entry_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no ticket {entry_id}")))?;

    let image = match format {
        ImageFormat::Vector => {
            let stored = EncodedImage::Svg(record.qr_svg);
            match params.size {
                Some(size) => resize(&stored, size)?,
                None => stored,
            }
        }
        ImageFormat::Raster => render(&record.sealed_token, ImageFormat::Raster, params.size)?,
    };

    let content_type = image.content_type();
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, CACHE_POLICY),
        ],
        image.into_bytes(),
    ))
}
