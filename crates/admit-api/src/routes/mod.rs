//! Route modules, one per API domain.

pub mod images;
pub mod tickets;
pub mod webhooks;
