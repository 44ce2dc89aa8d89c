//! # CSV Export — Operator-Facing Record Dump
//!
//! Serializes a filtered record set into RFC 4180 CSV with the column set
//! operators already rely on. Every cell is quoted and embedded quotes are
//! doubled, so titles like `Backstage "VIP" Pass` survive spreadsheets.

use admit_core::CredentialRecord;

/// CSV header row.
const HEADERS: [&str; 11] = [
    "Ticket ID",
    "Order",
    "Product",
    "Variant",
    "Type",
    "Buyer Email",
    "Buyer Name",
    "Status",
    "Created At",
    "Scanned At",
    "Scanned By",
];

/// Serialize records into a CSV document, header row first.
pub fn to_csv(records: &[CredentialRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADERS.iter().map(|h| quote(h)).collect::<Vec<_>>().join(","));

    for r in records {
        let row = [
            r.entry_id.as_str().to_string(),
            r.order_name.clone(),
            r.product_title.clone(),
            r.variant_title.clone().unwrap_or_default(),
            r.category_label.clone(),
            r.buyer_email.clone(),
            r.buyer_name.clone().unwrap_or_default(),
            r.status.to_string(),
            r.created_at.to_iso8601(),
            r.redeemed_at.map(|t| t.to_iso8601()).unwrap_or_default(),
            r.redeemed_by.clone().unwrap_or_default(),
        ];
        lines.push(row.iter().map(|c| quote(c)).collect::<Vec<_>>().join(","));
    }

    lines.join("\n")
}

/// Quote one CSV cell, doubling embedded quotes.
fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
