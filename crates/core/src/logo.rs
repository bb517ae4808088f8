//! Branding logo decoding.
//!
//! Logos are stored as `data:` URIs. Decoding yields raw RGB pixels ready
//! for embedding; any failure is reported as a [`LogoDecodeError`] so the
//! report compiler can skip the logo without failing the document.

use base64::Engine as _;

/// Media types accepted for logos.
pub const SUPPORTED_LOGO_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "image/webp"];

/// Largest decoded payload accepted, in bytes.
pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// A decoded logo as 8-bit RGB pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples, `width * height * 3` bytes.
    pub rgb: Vec<u8>,
}

impl LogoImage {
    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogoDecodeError {
    #[error("Logo is not a base64 data URI")]
    NotDataUri,

    #[error("Unsupported logo media type '{0}'")]
    UnsupportedMediaType(String),

    #[error("Logo payload is too large ({0} bytes)")]
    TooLarge(usize),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid image data: {0}")]
    Image(#[from] image::ImageError),
}

/// Split `data:<media>;base64,<payload>` into media type and payload.
fn split_data_uri(uri: &str) -> Result<(&str, &str), LogoDecodeError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or(LogoDecodeError::NotDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(LogoDecodeError::NotDataUri)?;
    let media = meta
        .strip_suffix(";base64")
        .ok_or(LogoDecodeError::NotDataUri)?;
    Ok((media, payload))
}

/// Decode a logo data URI into RGB pixels.
pub fn decode_logo(data_uri: &str) -> Result<LogoImage, LogoDecodeError> {
    let (media, payload) = split_data_uri(data_uri)?;
    let media = media.to_ascii_lowercase();
    if !SUPPORTED_LOGO_TYPES.contains(&media.as_str()) {
        return Err(LogoDecodeError::UnsupportedMediaType(media));
    }

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    if bytes.len() > MAX_LOGO_BYTES {
        return Err(LogoDecodeError::TooLarge(bytes.len()));
    }

    let rgb = image::load_from_memory(&bytes)?.to_rgb8();
    Ok(LogoImage {
        width: rgb.width(),
        height: rgb.height(),
        rgb: rgb.into_raw(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;

    use super::*;

    fn png_data_uri(width: u32, height: u32) -> String {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(buf.into_inner());
        format!("data:image/png;base64,{encoded}")
    }

    #[test]
    fn decodes_png_data_uri() {
        let logo = decode_logo(&png_data_uri(4, 2)).unwrap();
        assert_eq!((logo.width, logo.height), (4, 2));
        assert_eq!(logo.rgb.len(), 4 * 2 * 3);
        assert_eq!(&logo.rgb[..3], &[200, 30, 30]);
        assert_eq!(logo.aspect_ratio(), 2.0);
    }

    #[test]
    fn rejects_plain_url() {
        assert_matches!(
            decode_logo("https://example.org/logo.png"),
            Err(LogoDecodeError::NotDataUri)
        );
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        assert_matches!(
            decode_logo("data:image/png,rawbytes"),
            Err(LogoDecodeError::NotDataUri)
        );
    }

    #[test]
    fn rejects_unsupported_media_type() {
        assert_matches!(
            decode_logo("data:image/svg+xml;base64,PHN2Zz4="),
            Err(LogoDecodeError::UnsupportedMediaType(m)) if m == "image/svg+xml"
        );
    }

    #[test]
    fn rejects_bad_base64() {
        assert_matches!(
            decode_logo("data:image/png;base64,***"),
            Err(LogoDecodeError::Base64(_))
        );
    }

    #[test]
    fn rejects_bytes_that_are_not_an_image() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"definitely not a png");
        assert_matches!(
            decode_logo(&format!("data:image/png;base64,{encoded}")),
            Err(LogoDecodeError::Image(_))
        );
    }
}
