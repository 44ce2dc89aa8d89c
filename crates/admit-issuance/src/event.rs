//! # Purchase Event Types — Order-Platform Webhook Payload
//!
//! The shapes delivered by the order platform's `orders/create` webhook,
//! reduced to the fields issuance consumes. Unknown fields are ignored —
//! the platform adds fields freely and the webhook must keep parsing.
//!
//! Numeric platform identifiers are accepted as either JSON numbers or
//! strings and normalized to strings, since the platform uses both across
//! API versions.

use serde::{Deserialize, Deserializer};

/// One `orders/create` event.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderEvent {
    /// Platform order id.
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Human-readable order name (e.g. `#1001`).
    pub name: String,
    /// Buyer email; absent on some point-of-sale orders.
    #[serde(default)]
    pub email: Option<String>,
    /// Buyer contact details.
    #[serde(default)]
    pub customer: Option<CustomerEvent>,
    /// Discount codes applied to the order.
    #[serde(default)]
    pub discount_codes: Vec<DiscountCodeEvent>,
    /// Purchased lines.
    #[serde(default)]
    pub line_items: Vec<LineItemEvent>,
}

/// Buyer details embedded in the order event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerEvent {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CustomerEvent {
    /// Joined display name, `None` when both parts are missing/blank.
    pub fn display_name(&self) -> Option<String> {
        let joined = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// A discount code applied to the order.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscountCodeEvent {
    pub code: String,
}

/// One purchased line.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemEvent {
    /// Platform line-item id.
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub variant_id: Option<String>,
    /// Product title at purchase time.
    pub title: String,
    #[serde(default)]
    pub variant_title: Option<String>,
    pub quantity: u32,
    /// Unit price as a decimal string — the platform's wire form, kept
    /// verbatim (never a float).
    #[serde(default)]
    pub price: Option<String>,
    /// Comma-separated product tags, when the event carries them.
    #[serde(default)]
    pub tags: Option<String>,
    /// Custom line properties (e.g. event name/date set by the theme).
    #[serde(default)]
    pub properties: Vec<LineItemProperty>,
}

/// A name/value line property.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemProperty {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl LineItemEvent {
    /// Look up a line property by name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value.as_deref())
    }

    /// The ticket class label: variant title when present, else product
    /// title.
    pub fn category_label(&self) -> &str {
        self.variant_title
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.title)
    }
}

/// Accept a JSON number or string and normalize to `String`.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::String(s) => s,
    })
}

/// Optional variant of [`id_string`].
fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeId {
        Number(i64),
        String(String),
        Null,
    }

    Ok(match Option::<MaybeId>::deserialize(deserializer)? {
        Some(MaybeId::Number(n)) => Some(n.to_string()),
        Some(MaybeId::String(s)) => Some(s),
        Some(MaybeId::Null) | None => None,
    })
}
