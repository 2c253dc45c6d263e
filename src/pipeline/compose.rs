//! PDF composition: six grayscale JPEGs → one A4 page.
//!
//! The JPEG bytes are embedded as-is (`/DCTDecode`), so no pixel is
//! re-compressed here. Each image gets its own XObject and is drawn with a
//! `cm` that scales the unit square onto the slot rectangle, which stretches
//! the image to the card size whatever its native aspect ratio.

use crate::error::Card2PdfError;
use crate::layout::{Rect, A4_HEIGHT_MM, A4_WIDTH_MM, PT_PER_MM};
use crate::pipeline::encode::GrayscaleImage;
use crate::slot::{PerSlot, Slot};
use chrono::{DateTime, TimeZone};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::Serialize;
use std::fmt::Display;
use tracing::{debug, info};

/// Where one slot's image ended up.
#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    pub slot: Slot,
    /// Target rectangle in millimetres, top-left origin.
    pub rect: Rect,
    pub source_width: u32,
    pub source_height: u32,
}

/// Output file name for a sheet generated at `now`.
///
/// `ID-<YYYY-MM-DD>-<unix-epoch-seconds>.pdf`, the date taken in `now`'s own
/// time zone.
pub fn file_name_for<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("ID-{}-{}.pdf", now.format("%Y-%m-%d"), now.timestamp())
}

/// XObject resource name for a slot.
fn xobject_name(slot: Slot) -> String {
    format!("Im{}", slot.index() + 1)
}

fn check_image(img: &GrayscaleImage, slot: Slot) -> Result<(), Card2PdfError> {
    if img.slot != slot {
        return Err(Card2PdfError::Composition(format!(
            "image for {} was filed under {}",
            img.slot, slot
        )));
    }
    if img.width == 0 || img.height == 0 {
        return Err(Card2PdfError::Composition(format!(
            "{} image has zero size ({}x{})",
            slot, img.width, img.height
        )));
    }
    if img.jpeg.is_empty() {
        return Err(Card2PdfError::Composition(format!(
            "{} image has no data",
            slot
        )));
    }
    Ok(())
}

fn image_xobject(img: &GrayscaleImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => img.width as i64,
            "Height" => img.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        img.jpeg.clone(),
    )
}

/// Drawing operations placing `name` onto `rect`.
fn draw_ops(name: &str, rect: &Rect) -> Vec<Operation> {
    let pts = rect.to_pdf_points(A4_HEIGHT_MM);
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::Real(pts.width),
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(pts.height),
                Object::Real(pts.x),
                Object::Real(pts.y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

/// Build the one-page PDF.
///
/// Every slot must hold an image; a missing or malformed entry is a
/// [`Card2PdfError::Composition`]. Images are drawn in canonical slot order,
/// each into the rectangle from [`Slot::rect`].
pub fn compose_sheet(
    images: &PerSlot<Option<GrayscaleImage>>,
) -> Result<(Vec<u8>, PerSlot<Placement>), Card2PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut xobjects = lopdf::Dictionary::new();
    let mut operations = Vec::new();
    let mut placements: PerSlot<Option<Placement>> = PerSlot::default();

    for (slot, img) in images.iter() {
        let img = img.as_ref().ok_or_else(|| {
            Card2PdfError::Composition(format!("no converted image for {}", slot))
        })?;
        check_image(img, slot)?;

        let name = xobject_name(slot);
        let image_id = doc.add_object(image_xobject(img));
        xobjects.set(name.as_bytes().to_vec(), Object::Reference(image_id));

        let rect = slot.rect();
        operations.extend(draw_ops(&name, &rect));
        debug!(
            "Placed {} ({}x{} px) at x={:.2}mm y={:.2}mm",
            slot, img.width, img.height, rect.x, rect.y
        );

        placements[slot] = Some(Placement {
            slot,
            rect,
            source_width: img.width,
            source_height: img.height,
        });
    }

    let content = Content { operations };
    let content_bytes = content
        .encode()
        .map_err(|e| Card2PdfError::Composition(format!("content stream: {e}")))?;
    let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), content_bytes));

    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real((A4_WIDTH_MM * PT_PER_MM) as f32),
        Object::Real((A4_HEIGHT_MM * PT_PER_MM) as f32),
    ];

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => media_box,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => xobjects,
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| Card2PdfError::Composition(format!("failed to serialise PDF: {e}")))?;
    info!("Composed sheet: {} bytes", buffer.len());

    let placements = placements
        .transpose()
        .map_err(|slot| Card2PdfError::Composition(format!("{} was not placed", slot)))?;
    Ok((buffer, placements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn tiny_image(slot: Slot) -> GrayscaleImage {
        let img = image::RgbaImage::from_pixel(8, 5, image::Rgba([90, 90, 90, 255]));
        crate::pipeline::encode::encode_jpeg(slot, img, 80).unwrap()
    }

    fn all_images() -> PerSlot<Option<GrayscaleImage>> {
        PerSlot::from_fn(|slot| Some(tiny_image(slot)))
    }

    #[test]
    fn file_name_is_zero_padded() {
        let t = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(file_name_for(&t), format!("ID-2024-03-07-{}.pdf", t.timestamp()));
        assert_eq!(file_name_for(&t), "ID-2024-03-07-1709802300.pdf");
    }

    #[test]
    fn file_name_uses_local_date_of_the_zone() {
        // 23:30 UTC on Dec 31 is already Jan 1 in UTC+2.
        let utc = Utc.with_ymd_and_hms(2023, 12, 31, 23, 30, 0).unwrap();
        let cairo = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(file_name_for(&cairo), format!("ID-2024-01-01-{}.pdf", utc.timestamp()));
    }

    #[test]
    fn composes_single_a4_page() {
        let (pdf, placements) = compose_sheet(&all_images()).expect("compose");
        assert!(pdf.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&pdf).expect("parse back");
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        assert_eq!(placements[Slot::StudentBack].rect, Slot::StudentBack.rect());
        assert_eq!(placements[Slot::GuarantorFront].source_width, 8);
    }

    #[test]
    fn missing_image_is_composition_error() {
        let mut images = all_images();
        images[Slot::GuardianFront] = None;
        let err = compose_sheet(&images).unwrap_err();
        assert!(matches!(err, Card2PdfError::Composition(_)));
        assert!(err.to_string().contains("guardian-front"));
    }

    #[test]
    fn empty_jpeg_is_composition_error() {
        let mut images = all_images();
        if let Some(img) = images[Slot::StudentFront].as_mut() {
            img.jpeg.clear();
        }
        assert!(matches!(
            compose_sheet(&images),
            Err(Card2PdfError::Composition(_))
        ));
    }

    #[test]
    fn misfiled_image_is_composition_error() {
        let mut images = all_images();
        images[Slot::StudentFront] = Some(tiny_image(Slot::StudentBack));
        assert!(matches!(
            compose_sheet(&images),
            Err(Card2PdfError::Composition(_))
        ));
    }
}
