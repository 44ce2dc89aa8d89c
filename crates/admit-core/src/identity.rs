//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the Admit Stack. These
//! prevent accidental identifier confusion — you cannot pass an `OrderId`
//! where an `EntryId` is expected.
//!
//! ## Security Invariant
//!
//! `ShopScope` is the tenant partition key. Every store lookup is keyed by
//! it, so a credential minted for one shop can never be resolved — let
//! alone redeemed — under another shop's scope.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Alphabet for base-36 rendering of the entry-id components.
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Unique identifier of one entry credential. Primary key of the backing
/// record and the only field the redemption path trusts out of a sealed
/// token.
///
/// Format: `TKT-<millis base36>-<7 random base36 chars>`, uppercased.
/// The time-based prefix keeps ids roughly sortable; the random suffix
/// makes collisions negligible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

/// Tenant partition key isolating one merchant's credentials from another's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShopScope(pub String);

/// Platform identifier of the purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// Platform identifier of one line item within an order. Together with
/// `OrderId` and `ShopScope` this forms the issuance idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItemId(pub String);

/// Opaque ciphertext string produced by the codec and embedded inside the
/// scannable image. Never inspected outside `admit-codec`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SealedToken(pub String);

impl EntryId {
    /// Wrap an existing entry identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh globally-unique entry identifier.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let mut rng = rand::thread_rng();
        let suffix: String = (0..7)
            .map(|_| BASE36[rng.gen_range(0..36)] as char)
            .collect();

        Self(format!("TKT-{}-{}", to_base36(millis), suffix).to_uppercase())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ShopScope {
    /// Wrap a shop domain (e.g. `my-store.myshopify.com`).
    pub fn new(scope: impl Into<String>) -> Self {
        Self(scope.into())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl OrderId {
    /// Wrap a platform order identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl LineItemId {
    /// Wrap a platform line-item identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SealedToken {
    /// Wrap an opaque token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ShopScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render an unsigned integer in lowercase base-36.
fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    // BASE36 holds only ASCII, so this cannot fail.
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_format() {
        let id = EntryId::generate();
        assert!(id.as_str().starts_with("TKT-"));
        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 7);
        assert_eq!(id.as_str(), id.as_str().to_uppercase());
    }

    #[test]
    fn test_generate_unique() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| EntryId::generate().0)
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_000_000), "lfls");
    }

    #[test]
    fn test_newtypes_are_distinct() {
        // Compile-time property; here we just exercise the constructors.
        let order = OrderId::new("5551212");
        let line = LineItemId::new("5551212");
        assert_eq!(order.as_str(), line.as_str());
    }

    #[test]
    fn test_serde_is_transparent_enough() {
        let scope = ShopScope::new("demo.myshopify.com");
        let json = serde_json::to_string(&scope).unwrap();
        assert_eq!(json, "\"demo.myshopify.com\"");
    }
}
