//! # Request Extractors
//!
//! Tenant scope comes from the `X-Shop-Domain` header on every tenant
//! route, including image retrieval. There is no fallback scope: a request
//! that does not name its shop is rejected before any store access.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use admit_core::ShopScope;

use crate::error::AppError;

/// Header carrying the tenant scope.
pub const SHOP_DOMAIN_HEADER: &str = "x-shop-domain";

/// Extracts the tenant scope from `X-Shop-Domain`.
#[derive(Debug, Clone)]
pub struct ShopDomain(pub ShopScope);

impl<S> FromRequestParts<S> for ShopDomain
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SHOP_DOMAIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Validation("missing or empty X-Shop-Domain header".to_string())
            })?;

        Ok(Self(ShopScope::new(value)))
    }
}
