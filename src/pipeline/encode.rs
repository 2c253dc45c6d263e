//! Image encoding: grayscale `RgbaImage` → JPEG bytes in a [`GrayscaleImage`].
//!
//! JPEG has no alpha channel, so each pixel is flattened onto opaque black
//! first: a gray value `y` with alpha `a` becomes `y * a / 255`. The input
//! buffer itself is not modified. The result can also be rendered as a `data:image/jpeg;base64,…` URL for
//! hosts that want to preview it.

use crate::error::Card2PdfError;
use crate::slot::Slot;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, RgbaImage};
use serde::Serialize;
use tracing::debug;

/// One slot's image after grayscale conversion, ready for the PDF.
#[derive(Debug, Clone, Serialize)]
pub struct GrayscaleImage {
    pub slot: Slot,
    /// Pixel width, identical to the decoded input.
    pub width: u32,
    /// Pixel height, identical to the decoded input.
    pub height: u32,
    /// Baseline JPEG, RGB, 8 bits per component.
    #[serde(skip)]
    pub jpeg: Vec<u8>,
}

impl GrayscaleImage {
    pub const MIME_TYPE: &'static str = "image/jpeg";

    /// Render the image as a base64 data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", Self::MIME_TYPE, STANDARD.encode(&self.jpeg))
    }
}

/// Flatten an RGBA buffer onto black, dropping the alpha channel.
pub fn flatten_on_black(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        let over = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        Rgb([over(r), over(g), over(b)])
    })
}

/// JPEG-encode a grayscale buffer.
pub fn encode_jpeg(
    slot: Slot,
    img: RgbaImage,
    quality: u8,
) -> Result<GrayscaleImage, Card2PdfError> {
    let (width, height) = img.dimensions();
    let rgb = flatten_on_black(&img);

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&rgb)
        .map_err(|e| Card2PdfError::Encode {
            slot,
            detail: e.to_string(),
        })?;
    debug!("Encoded {} → {} bytes JPEG (q={})", slot, jpeg.len(), quality);

    Ok(GrayscaleImage {
        slot,
        width,
        height,
        jpeg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn encode_keeps_dimensions() {
        let img = RgbaImage::from_pixel(31, 7, Rgba([128, 128, 128, 255]));
        let out = encode_jpeg(Slot::StudentBack, img, 90).expect("encode should succeed");
        assert_eq!((out.width, out.height), (31, 7));
        assert_eq!(&out.jpeg[..2], &[0xFF, 0xD8], "JPEG SOI marker");

        let decoded = image::load_from_memory(&out.jpeg).expect("valid JPEG");
        assert_eq!((decoded.width(), decoded.height()), (31, 7));
    }

    #[test]
    fn flatten_scales_by_alpha() {
        let img = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([124, 124, 124, 128]),
            1 => Rgba([200, 200, 200, 255]),
            _ => Rgba([255, 255, 255, 0]),
        });
        let rgb = flatten_on_black(&img);
        assert_eq!(rgb.get_pixel(0, 0).0, [62, 62, 62]);
        assert_eq!(rgb.get_pixel(1, 0).0, [200, 200, 200]);
        assert_eq!(rgb.get_pixel(2, 0).0, [0, 0, 0]);
    }

    #[test]
    fn half_transparent_pixels_encode_darker() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([124, 124, 124, 128]));
        let out = encode_jpeg(Slot::GuarantorBack, img, 100).unwrap();
        let decoded = image::load_from_memory(&out.jpeg).unwrap().into_rgb8();
        for px in decoded.pixels() {
            assert!(px[0].abs_diff(62) <= 2, "got {:?}", px);
        }
    }

    #[test]
    fn data_url_is_valid_base64_jpeg() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 10, 10, 255]));
        let out = encode_jpeg(Slot::GuardianFront, img, 92).unwrap();
        let url = out.to_data_url();
        let b64 = url
            .strip_prefix("data:image/jpeg;base64,")
            .expect("data URL prefix");
        let decoded = STANDARD.decode(b64).expect("valid base64");
        assert_eq!(decoded, out.jpeg);
    }
}
