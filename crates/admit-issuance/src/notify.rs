//! # Distribution Notifier — Post-Issuance Delivery Boundary
//!
//! Issuance persists credentials; delivery hands them to the buyer. The
//! two are decoupled on purpose: a persisted record is the source of
//! truth, and a failed delivery never unwinds it. [`notify_all`] therefore
//! logs delivery failures instead of propagating them.

use async_trait::async_trait;
use thiserror::Error;

use admit_core::CredentialRecord;

/// Errors surfaced by a notifier backend.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// The delivery channel rejected the send.
    #[error("delivery failed for {recipient}: {reason}")]
    Delivery { recipient: String, reason: String },
}

/// One buyer's batch of freshly issued credentials.
#[derive(Debug, Clone)]
pub struct DeliveryGroup {
    pub buyer_email: String,
    pub buyer_name: Option<String>,
    pub records: Vec<CredentialRecord>,
}

/// Group issued records by buyer email, preserving first-seen order.
pub fn group_by_buyer(records: &[CredentialRecord]) -> Vec<DeliveryGroup> {
    let mut groups: Vec<DeliveryGroup> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|g| g.buyer_email == record.buyer_email) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(DeliveryGroup {
                buyer_email: record.buyer_email.clone(),
                buyer_name: record.buyer_name.clone(),
                records: vec![record.clone()],
            }),
        }
    }
    groups
}

/// Delivery channel for issued credentials.
#[async_trait]
pub trait DistributionNotifier: Send + Sync {
    /// Deliver one buyer's batch.
    async fn deliver(&self, group: &DeliveryGroup) -> Result<(), NotificationError>;
}

/// Notifier that only logs. Stands in until a mail channel is wired up.
pub struct LoggingNotifier;

#[async_trait]
impl DistributionNotifier for LoggingNotifier {
    async fn deliver(&self, group: &DeliveryGroup) -> Result<(), NotificationError> {
        tracing::info!(
            recipient = %group.buyer_email,
            count = group.records.len(),
            "credential delivery (logging channel)"
        );
        Ok(())
    }
}

/// Fan records out to their buyers. Failures are logged per group and do
/// not stop the remaining deliveries. Returns the number of groups
/// delivered successfully.
pub async fn notify_all(notifier: &dyn DistributionNotifier, records: &[CredentialRecord]) -> usize {
    let mut delivered = 0;
    for group in group_by_buyer(records) {
        match notifier.deliver(&group).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::warn!(
                    recipient = %group.buyer_email,
                    error = %e,
                    "credential delivery failed, records remain persisted"
                );
            }
        }
    }
    delivered
}
