//! # admit-qr — Credential Image Encoder
//!
//! Renders an opaque sealed token into a scannable 2-D barcode. Pure
//! transforms of string → image bytes; no I/O and no knowledge of what the
//! token contains.
//!
//! ## Robustness Invariant
//!
//! Every render uses error-correction level **H** (~30% recoverable). Entry
//! tickets get printed, creased, displayed on cracked phone screens and
//! scanned under bad light.
//!
//! ## Immutability Invariant
//!
//! [`resize`] is a dimension-only transform. The encoded module matrix —
//! and therefore the token — is never regenerated: resizing relabels the
//! same credential, it does not re-mint one.

mod render;
mod resize;

pub use render::{render, EncodedImage, ImageFormat, QrError, DEFAULT_SIZE};
pub use resize::resize;
