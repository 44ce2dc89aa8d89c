//! # Shared Application State
//!
//! One store, one issuance engine, one redemption engine, one notifier,
//! all behind `Arc` so the state clones cheaply into every handler.

use std::sync::Arc;

use admit_issuance::{DistributionNotifier, IssuanceEngine, LoggingNotifier};
use admit_redemption::RedemptionEngine;
use admit_store::{CredentialStore, MemoryStore};

use crate::config::AppConfig;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub issuance: Arc<IssuanceEngine>,
    pub redemption: Arc<RedemptionEngine>,
    pub notifier: Arc<dyn DistributionNotifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire up engines over an in-memory store.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    /// Wire up engines over an existing store.
    pub fn with_store(store: Arc<dyn CredentialStore>, config: AppConfig) -> Self {
        let issuance = Arc::new(IssuanceEngine::new(
            store.clone(),
            config.seal_key.clone(),
            config.issuance_config(),
        ));
        let redemption = Arc::new(RedemptionEngine::new(
            store.clone(),
            config.seal_key.clone(),
            config.store_timeout,
        ));
        Self {
            store,
            issuance,
            redemption,
            notifier: Arc::new(LoggingNotifier),
            config: Arc::new(config),
        }
    }
}
