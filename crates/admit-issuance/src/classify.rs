//! # Ticket-Line Classification
//!
//! Decides whether a purchase line should mint credentials at all. This is
//! a fuzzy membership test over merchant-authored text, not part of the
//! cryptographic core: the configured ticket tag (default `"ticket"`) is
//! matched case-insensitively against the line's product tags and title,
//! alongside a small set of known entry keywords.

use crate::event::LineItemEvent;

/// Default tag marking a product as ticket-eligible.
pub const DEFAULT_TICKET_TAG: &str = "ticket";

/// Title keywords that mark a line as an entry product even without the
/// configured tag.
const ENTRY_KEYWORDS: [&str; 2] = ["entrada", "entry"];

/// Whether this purchase line is ticket-eligible.
pub fn is_ticket_line(line: &LineItemEvent, ticket_tag: &str) -> bool {
    let tag = ticket_tag.to_lowercase();
    let title = line.title.to_lowercase();
    let tags = line.tags.as_deref().unwrap_or("").to_lowercase();

    if tags.contains(&tag) || title.contains(&tag) {
        return true;
    }
    ENTRY_KEYWORDS.iter().any(|kw| title.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(title: &str, tags: Option<&str>) -> LineItemEvent {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": title,
            "quantity": 1,
            "tags": tags,
        }))
        .unwrap()
    }

    #[test]
    fn test_matches_tag_set() {
        assert!(is_ticket_line(&line("Poster", Some("merch, Ticket")), DEFAULT_TICKET_TAG));
    }

    #[test]
    fn test_matches_title_case_insensitive() {
        assert!(is_ticket_line(&line("VIP TICKET bundle", None), DEFAULT_TICKET_TAG));
    }

    #[test]
    fn test_matches_entry_keywords() {
        assert!(is_ticket_line(&line("Entrada General", None), DEFAULT_TICKET_TAG));
        assert!(is_ticket_line(&line("Early Entry Pass", None), DEFAULT_TICKET_TAG));
    }

    #[test]
    fn test_custom_tag() {
        assert!(is_ticket_line(&line("Gala Seat", Some("admission")), "admission"));
        assert!(!is_ticket_line(&line("Gala Seat", Some("admission")), "ticket2026"));
    }

    #[test]
    fn test_plain_merch_rejected() {
        assert!(!is_ticket_line(&line("Tour T-Shirt", Some("merch, apparel")), DEFAULT_TICKET_TAG));
    }
}
