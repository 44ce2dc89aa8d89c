//! # Error Types — Core Validation Failures
//!
//! Errors raised at the deserialization and parsing boundary of the core
//! types. All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.

use thiserror::Error;

/// Validation failures in core type constructors and parsers.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A timestamp string did not satisfy the UTC-only format rules.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A status string did not name a known credential status.
    #[error("unknown credential status: {0:?}")]
    UnknownStatus(String),

    /// An identifier failed validation (empty or malformed).
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
