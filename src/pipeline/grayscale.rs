//! Luminosity grayscale transform.
//!
//! Each pixel's red, green and blue channels are replaced by the ITU-R BT.601
//! luma of the pixel, `0.299 R + 0.587 G + 0.114 B`, computed in `f64` and
//! rounded half to even when stored back into a byte. Alpha is left alone.

use crate::error::Card2PdfError;
use crate::slot::Slot;
use image::RgbaImage;
use tracing::debug;

pub const RED_WEIGHT: f64 = 0.299;
pub const GREEN_WEIGHT: f64 = 0.587;
pub const BLUE_WEIGHT: f64 = 0.114;

/// Luma of one RGB triple, rounded to the nearest integer (ties to even).
pub fn luminosity(r: u8, g: u8, b: u8) -> u8 {
    let y = r as f64 * RED_WEIGHT + g as f64 * GREEN_WEIGHT + b as f64 * BLUE_WEIGHT;
    y.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Apply the transform in place to a raw RGBA8 buffer.
///
/// One pass, one visit per pixel. A trailing partial pixel (buffer length not
/// a multiple of four) is left untouched.
pub fn apply_luminosity(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let y = luminosity(px[0], px[1], px[2]);
        px[0] = y;
        px[1] = y;
        px[2] = y;
    }
}

/// Convert a decoded image to grayscale in place.
pub fn to_grayscale(img: &mut RgbaImage) {
    apply_luminosity(img);
}

/// Decode raw image bytes into an RGBA8 buffer.
pub fn decode(slot: Slot, bytes: &[u8]) -> Result<RgbaImage, Card2PdfError> {
    let img = image::load_from_memory(bytes).map_err(|e| Card2PdfError::Decode {
        slot,
        detail: e.to_string(),
    })?;
    let rgba = img.into_rgba8();
    debug!("Decoded {} → {}x{} px", slot, rgba.width(), rgba.height());
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(Card2PdfError::Decode {
            slot,
            detail: "image has no pixels".into(),
        });
    }
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn reference_colours() {
        assert_eq!(luminosity(255, 0, 0), 76);
        assert_eq!(luminosity(0, 255, 0), 150);
        assert_eq!(luminosity(0, 0, 255), 29);
        assert_eq!(luminosity(255, 255, 255), 255);
        assert_eq!(luminosity(0, 0, 0), 0);
    }

    #[test]
    fn exact_halves_round_to_even() {
        // 250 * 0.114 == 28.5
        assert_eq!(luminosity(0, 0, 250), 28);
        // 0.299 * 255 + 0.114 * 255 == 105.315, no tie
        assert_eq!(luminosity(255, 0, 255), 105);
    }

    #[test]
    fn alpha_is_preserved() {
        let mut px = [255u8, 0, 0, 17, 0, 0, 255, 200];
        apply_luminosity(&mut px);
        assert_eq!(px, [76, 76, 76, 17, 29, 29, 29, 200]);
    }

    #[test]
    fn gray_pixels_are_fixed_points() {
        for g in 0..=255u8 {
            assert_eq!(luminosity(g, g, g), g, "gray {g} moved");
        }
    }

    #[test]
    fn transform_is_idempotent() {
        let mut img = RgbaImage::from_fn(17, 9, |x, y| {
            Rgba([(x * 15) as u8, (y * 28) as u8, ((x + y) * 9) as u8, 255 - x as u8])
        });
        to_grayscale(&mut img);
        let once = img.clone();
        to_grayscale(&mut img);
        assert_eq!(once, img);
    }

    #[test]
    fn partial_trailing_pixel_untouched() {
        let mut buf = [10u8, 20, 30, 40, 255, 0];
        apply_luminosity(&mut buf);
        assert_eq!(&buf[4..], &[255, 0]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode(Slot::GuarantorFront, b"this is not an image").unwrap_err();
        assert!(matches!(err, Card2PdfError::Decode { slot: Slot::GuarantorFront, .. }));
    }
}
