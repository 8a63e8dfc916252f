//! Picture encoding: `DynamicImage` → JPEG bytes → content id.
//!
//! The file name of every extracted picture is derived from the encoded
//! bytes alone, so the same figure appearing on several pages (logos,
//! repeated diagrams) lands in one file. Encoding is deterministic for a
//! fixed encoder and quality, which is what makes the id stable.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Number of hex characters kept from the SHA-256 digest.
pub const CONTENT_ID_LEN: usize = 16;

/// Encode a picture as baseline JPEG at the given quality.
///
/// JPEG has no alpha channel, so the image is flattened to 8-bit RGB first
/// (transparent regions keep their underlying colour).
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
        encoder.encode_image(&rgb)?;
    }

    debug!(
        "Encoded {}x{} picture → {} bytes JPEG",
        rgb.width(),
        rgb.height(),
        buf.len()
    );
    Ok(buf)
}

/// First [`CONTENT_ID_LEN`] lowercase hex characters of `sha256(bytes)`.
pub fn content_id(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    digest[..CONTENT_ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn content_id_known_vector() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223…
        assert_eq!(content_id(b"abc"), "ba7816bf8f01cfea");
        assert_eq!(content_id(b"").len(), CONTENT_ID_LEN);
    }

    #[test]
    fn encode_produces_jpeg() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([10, 200, 30])));
        let bytes = encode_jpeg(&img, 75).expect("encode should succeed");
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));
        let decoded = image::load_from_memory(&bytes).expect("valid jpeg");
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn encode_is_deterministic() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(32, 24, |x, y| {
            Rgb([(x * 7) as u8, (y * 11) as u8, 90])
        }));
        let a = encode_jpeg(&img, 75).unwrap();
        let b = encode_jpeg(&img.clone(), 75).unwrap();
        assert_eq!(content_id(&a), content_id(&b));
    }

    #[test]
    fn encode_flattens_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 128])));
        let bytes = encode_jpeg(&img, 90).expect("rgba input must be accepted");
        assert!(!bytes.is_empty());
    }
}
