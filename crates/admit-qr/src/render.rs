//! # QR Rendering — Token String to Vector/Raster Image
//!
//! The vector (SVG) form is preferred for print and display scaling and is
//! what issuance persists on the record. The raster (PNG) form is derived
//! on demand for static embedding (e.g. email clients that strip SVG).
//!
//! The raster path builds its pixel buffer directly from the QR module
//! matrix rather than going through a renderer trait, so the barcode and
//! image crates stay decoupled.

use std::io::Cursor;

use image::{GrayImage, ImageFormat as PixelFormat, Luma};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

use admit_core::SealedToken;

/// Default edge length in pixels when no size hint is given.
pub const DEFAULT_SIZE: u32 = 512;

/// Quiet-zone width in modules around the raster rendering.
const QUIET_MODULES: u32 = 4;

/// Requested output form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// SVG markup; scales losslessly.
    Vector,
    /// PNG bytes; for static embedding.
    Raster,
}

/// A rendered credential image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedImage {
    /// SVG markup.
    Svg(String),
    /// PNG bytes.
    Png(Vec<u8>),
}

impl EncodedImage {
    /// MIME type for HTTP responses.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Svg(_) => "image/svg+xml",
            Self::Png(_) => "image/png",
        }
    }

    /// Consume into raw response bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Svg(markup) => markup.into_bytes(),
            Self::Png(bytes) => bytes,
        }
    }
}

/// Errors raised by the image encoder.
#[derive(Error, Debug)]
pub enum QrError {
    /// The token could not be encoded as a QR matrix (e.g. too long for
    /// the symbol capacity at level H).
    #[error("qr encoding failed: {0}")]
    Encode(String),

    /// PNG encoding or decoding failed.
    #[error("raster processing failed: {0}")]
    Raster(String),
}

/// Encode a sealed token into a scannable image at error-correction
/// level H.
///
/// `size_hint` is the approximate edge length in pixels (default
/// [`DEFAULT_SIZE`]). The vector form records the size as its root
/// dimensions; the raster form snaps to a whole number of pixels per
/// module.
pub fn render(
    token: &SealedToken,
    format: ImageFormat,
    size_hint: Option<u32>,
) -> Result<EncodedImage, QrError> {
    let size = size_hint.unwrap_or(DEFAULT_SIZE).max(1);
    let code = QrCode::with_error_correction_level(token.as_str(), EcLevel::H)
        .map_err(|e| QrError::Encode(e.to_string()))?;

    match format {
        ImageFormat::Vector => Ok(EncodedImage::Svg(render_svg(&code, size))),
        ImageFormat::Raster => Ok(EncodedImage::Png(render_png(&code, size)?)),
    }
}

/// Render the module matrix as SVG markup, black on white.
fn render_svg(code: &QrCode, size: u32) -> String {
    code.render::<svg::Color<'_>>()
        .min_dimensions(size, size)
        .quiet_zone(true)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build()
}

/// Render the module matrix as a grayscale PNG, black on white.
fn render_png(code: &QrCode, size: u32) -> Result<Vec<u8>, QrError> {
    let modules = code.width() as u32;
    let total_modules = modules + 2 * QUIET_MODULES;
    let scale = (size / total_modules).max(1);
    let dim = total_modules * scale;

    let colors = code.to_colors();
    let mut img = GrayImage::from_pixel(dim, dim, Luma([0xff]));

    for (i, color) in colors.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let mx = (i as u32 % modules + QUIET_MODULES) * scale;
        let my = (i as u32 / modules + QUIET_MODULES) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(mx + dx, my + dy, Luma([0x00]));
            }
        }
    }

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, PixelFormat::Png)
        .map_err(|e| QrError::Raster(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SealedToken {
        SealedToken::new("dGVzdC10b2tlbi1jaXBoZXJ0ZXh0LWJ5dGVzLWhlcmU=")
    }

    #[test]
    fn test_render_svg_has_dimensions() {
        let img = render(&token(), ImageFormat::Vector, None).unwrap();
        let EncodedImage::Svg(markup) = img else {
            panic!("expected svg");
        };
        assert!(markup.starts_with("<?xml") || markup.starts_with("<svg"));
        assert!(markup.contains("width=\""));
        assert!(markup.contains("height=\""));
    }

    #[test]
    fn test_render_png_magic_bytes() {
        let img = render(&token(), ImageFormat::Raster, Some(256)).unwrap();
        let EncodedImage::Png(bytes) = img else {
            panic!("expected png");
        };
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_render_png_is_square_and_scaled() {
        let EncodedImage::Png(bytes) = render(&token(), ImageFormat::Raster, Some(512)).unwrap()
        else {
            panic!("expected png");
        };
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), decoded.height());
        assert!(decoded.width() <= 512);
        assert!(decoded.width() > 0);
    }

    #[test]
    fn test_render_same_token_same_matrix() {
        // Rendering is deterministic over the token string.
        let a = render(&token(), ImageFormat::Vector, Some(256)).unwrap();
        let b = render(&token(), ImageFormat::Vector, Some(256)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_content_types() {
        assert_eq!(
            render(&token(), ImageFormat::Vector, None).unwrap().content_type(),
            "image/svg+xml"
        );
        assert_eq!(
            render(&token(), ImageFormat::Raster, None).unwrap().content_type(),
            "image/png"
        );
    }

    #[test]
    fn test_oversized_payload_rejected() {
        // QR at level H caps out well below 8 KiB of data.
        let huge = SealedToken::new("A".repeat(8192));
        assert!(matches!(
            render(&huge, ImageFormat::Vector, None),
            Err(QrError::Encode(_))
        ));
    }
}
