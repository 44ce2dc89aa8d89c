//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from the store, issuance and redemption crates to
//! HTTP status codes with a JSON error body. Internal error details are
//! never exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use admit_issuance::IssuanceError;
use admit_qr::QrError;
use admit_redemption::RedemptionError;
use admit_store::StoreError;

/// Structured JSON error response body.
///
/// All error responses use this format across the API surface.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422). Both JSON shape problems and
    /// business-rule violations land here; only malformed HTTP framing
    /// is 400.
    #[error("validation error: {0}")]
    Validation(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned
    /// to the client.
    #[error("internal error: {0}")]
    Internal(String),

    /// The backing store is unreachable (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A redemption write timed out with the entry still redeemable; the
    /// operator should re-scan (503).
    #[error("store timed out; re-scan the entry")]
    StoreTimeout,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::StoreTimeout => (StatusCode::SERVICE_UNAVAILABLE, "STORE_TIMEOUT"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            Self::StoreTimeout => tracing::warn!("redemption store timeout surfaced to client"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("no ticket {id}")),
            StoreError::Duplicate(_) | StoreError::InvalidTransition { .. } => {
                Self::Conflict(err.to_string())
            }
            StoreError::Unavailable(_) => Self::ServiceUnavailable(err.to_string()),
        }
    }
}

impl From<RedemptionError> for AppError {
    fn from(err: RedemptionError) -> Self {
        match err {
            RedemptionError::Store(e) => e.into(),
            RedemptionError::StoreTimeout => Self::StoreTimeout,
        }
    }
}

impl From<IssuanceError> for AppError {
    fn from(err: IssuanceError) -> Self {
        match err {
            IssuanceError::Store(e) => e.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<QrError> for AppError {
    fn from(err: QrError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let (status, body) = response_parts(AppError::NotFound("ticket X".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
        assert!(body.error.message.contains("ticket X"));
    }

    #[tokio::test]
    async fn test_validation_response() {
        let (status, body) = response_parts(AppError::Validation("bad status".into())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("lock poisoned".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("lock poisoned"));
    }

    #[tokio::test]
    async fn test_store_timeout_response() {
        let (status, body) = response_parts(AppError::StoreTimeout).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error.code, "STORE_TIMEOUT");
    }

    #[test]
    fn test_store_error_mappings() {
        use admit_core::{CredentialStatus, EntryId};

        let err: AppError = StoreError::NotFound(EntryId::new("TKT-X-1")).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = StoreError::Duplicate(EntryId::new("TKT-X-1")).into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = StoreError::InvalidTransition {
            entry_id: EntryId::new("TKT-X-1"),
            from: CredentialStatus::Scanned,
            to: CredentialStatus::Valid,
        }
        .into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = StoreError::Unavailable("down".into()).into();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_redemption_timeout_maps_to_store_timeout() {
        let err: AppError = RedemptionError::StoreTimeout.into();
        assert!(matches!(err, AppError::StoreTimeout));
    }
}
