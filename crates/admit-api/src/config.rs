//! # Runtime Configuration
//!
//! All configuration comes from the environment (a `.env` file is loaded
//! first when present). The seal key has no default: a process without
//! `ADMIT_SEAL_KEY` refuses to start rather than mint tokens under a
//! well-known key.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use admit_codec::SealKey;
use admit_issuance::engine::IssuanceConfig;
use admit_qr::DEFAULT_SIZE;

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is present but unparseable.
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket the HTTP server binds.
    pub bind_addr: SocketAddr,
    /// 32-byte seal key, hex-encoded in `ADMIT_SEAL_KEY`.
    pub seal_key: SealKey,
    /// Tag marking products as ticket-eligible.
    pub ticket_tag: String,
    /// Edge length of persisted credential images.
    pub image_size: u32,
    /// Deliver credentials to buyers right after webhook issuance.
    pub auto_notify: bool,
    /// Ceiling on the atomic redemption write.
    pub store_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] when `ADMIT_SEAL_KEY` is absent;
    /// [`ConfigError::Invalid`] for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = match std::env::var("ADMIT_BIND_ADDR") {
            Ok(v) => v.parse().map_err(|e| ConfigError::Invalid {
                var: "ADMIT_BIND_ADDR",
                reason: format!("{e}"),
            })?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let hex = std::env::var("ADMIT_SEAL_KEY")
            .map_err(|_| ConfigError::Missing("ADMIT_SEAL_KEY"))?;
        let seal_key = SealKey::from_hex(&hex).map_err(|e| ConfigError::Invalid {
            var: "ADMIT_SEAL_KEY",
            reason: e.to_string(),
        })?;

        let ticket_tag = std::env::var("ADMIT_TICKET_TAG")
            .unwrap_or_else(|_| admit_issuance::classify::DEFAULT_TICKET_TAG.to_string());

        let image_size = match std::env::var("ADMIT_QR_SIZE") {
            Ok(v) => v.parse().map_err(|e| ConfigError::Invalid {
                var: "ADMIT_QR_SIZE",
                reason: format!("{e}"),
            })?,
            Err(_) => DEFAULT_SIZE,
        };

        let auto_notify = match std::env::var("ADMIT_AUTO_NOTIFY") {
            Ok(v) => v.to_lowercase() != "false",
            Err(_) => true,
        };

        let store_timeout = match std::env::var("ADMIT_STORE_TIMEOUT_SECS") {
            Ok(v) => {
                let secs: u64 = v.parse().map_err(|e| ConfigError::Invalid {
                    var: "ADMIT_STORE_TIMEOUT_SECS",
                    reason: format!("{e}"),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => admit_redemption::DEFAULT_STORE_TIMEOUT,
        };

        Ok(Self {
            bind_addr,
            seal_key,
            ticket_tag,
            image_size,
            auto_notify,
            store_timeout,
        })
    }

    /// Issuance knobs derived from this configuration.
    pub fn issuance_config(&self) -> IssuanceConfig {
        IssuanceConfig {
            ticket_tag: self.ticket_tag.clone(),
            image_size: self.image_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issuance_config_mirrors_app_config() {
        let config = AppConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            seal_key: SealKey::from_bytes([1u8; 32]),
            ticket_tag: "admission".to_string(),
            image_size: 256,
            auto_notify: false,
            store_timeout: Duration::from_secs(1),
        };
        let issuance = config.issuance_config();
        assert_eq!(issuance.ticket_tag, "admission");
        assert_eq!(issuance.image_size, 256);
    }
}
