//! # Resize — Dimension-Only Image Transform
//!
//! Resizing relabels an already-rendered credential image; it must never
//! re-encode the token. For SVG this is a width/height attribute rewrite on
//! the root element, leaving the path data untouched (the behavior the
//! image-retrieval endpoint has always had). For PNG it is a
//! nearest-neighbor rescale, which keeps module edges crisp for scanners.

use std::io::Cursor;

use image::imageops::FilterType;
use image::ImageFormat as PixelFormat;

use crate::render::{EncodedImage, QrError};

/// Resize a rendered image to `target` pixels per edge.
///
/// # Errors
///
/// Returns [`QrError::Raster`] if PNG bytes cannot be decoded or
/// re-encoded. SVG resizing is infallible.
pub fn resize(image: &EncodedImage, target: u32) -> Result<EncodedImage, QrError> {
    let target = target.max(1);
    match image {
        EncodedImage::Svg(markup) => Ok(EncodedImage::Svg(rewrite_svg_dimensions(markup, target))),
        EncodedImage::Png(bytes) => {
            let decoded = image::load_from_memory(bytes)
                .map_err(|e| QrError::Raster(e.to_string()))?;
            let scaled = decoded.resize_exact(target, target, FilterType::Nearest);
            let mut out = Cursor::new(Vec::new());
            scaled
                .write_to(&mut out, PixelFormat::Png)
                .map_err(|e| QrError::Raster(e.to_string()))?;
            Ok(EncodedImage::Png(out.into_inner()))
        }
    }
}

/// Replace the `width`/`height` attributes on the root `<svg>` element.
///
/// Attributes elsewhere (and the viewBox, which preserves the coordinate
/// system) are left alone.
fn rewrite_svg_dimensions(markup: &str, target: u32) -> String {
    let Some(open) = markup.find("<svg") else {
        return markup.to_string();
    };
    let Some(tag_len) = markup[open..].find('>') else {
        return markup.to_string();
    };
    let close = open + tag_len;

    let mut tag = markup[open..close].to_string();
    strip_attribute(&mut tag, "width");
    strip_attribute(&mut tag, "height");
    tag.push_str(&format!(" width=\"{target}\" height=\"{target}\""));

    let mut out = String::with_capacity(markup.len() + 32);
    out.push_str(&markup[..open]);
    out.push_str(&tag);
    out.push_str(&markup[close..]);
    out
}

/// Remove every ` name="value"` occurrence from an element tag.
fn strip_attribute(tag: &mut String, name: &str) {
    let needle = format!(" {name}=\"");
    while let Some(pos) = tag.find(&needle) {
        let value_start = pos + needle.len();
        match tag[value_start..].find('"') {
            Some(quote) => tag.replace_range(pos..value_start + quote + 1, ""),
            None => break,
        }
    }
}
