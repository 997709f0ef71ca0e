//! Image resource helpers.
//!
//! A browser fires the image `error` event both when a resource cannot be
//! fetched and when the fetched bytes cannot be decoded. These helpers cover
//! the second half for the headless page: `data:` URLs (the generation
//! backend may inline its PNG as base64) and a full decode of raster data.

use crate::{Error, Result};
use base64::Engine as _;
use image::ImageFormat;

/// What a successfully loaded resource turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Decoded raster image
    Raster {
        format: ImageFormat,
        width: u32,
        height: u32,
    },
    /// SVG markup; not rasterized, only recognized
    Svg,
}

fn is_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Succeeds only when `bytes` decode to a displayable image
pub fn check_image(bytes: &[u8]) -> Result<ImageKind> {
    if bytes.is_empty() {
        return Err(Error::ImageLoadError("empty resource".into()));
    }
    if is_svg(bytes) {
        return Ok(ImageKind::Svg);
    }

    let format = image::guess_format(bytes)
        .map_err(|e| Error::ImageLoadError(format!("unrecognized image format: {}", e)))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| Error::ImageLoadError(format!("undecodable {:?} image: {}", format, e)))?;

    Ok(ImageKind::Raster {
        format,
        width: decoded.width(),
        height: decoded.height(),
    })
}

/// Decode a `data:[<mediatype>][;base64],<data>` URL into raw bytes.
///
/// Non-base64 payloads are taken verbatim; percent-escapes are not decoded.
pub fn decode_data_url(src: &str) -> Result<Vec<u8>> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| Error::ImageLoadError(format!("not a data URL: {}", src)))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::ImageLoadError("data URL without payload".into()))?;

    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| Error::ImageLoadError(format!("invalid base64 payload: {}", e)))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// A small, fully valid PNG for tests
#[cfg(test)]
pub(crate) fn encoded_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
