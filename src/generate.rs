//! Sheet generation entry points.
//!
//! [`generate`] validates the six selections, converts them concurrently and
//! composes the PDF once every conversion has succeeded. The first failing
//! slot aborts the whole run; there is no partial sheet.

use crate::config::SheetConfig;
use crate::error::Card2PdfError;
use crate::output::{GeneratedSheet, SheetStats};
use crate::pipeline::compose::{compose_sheet, file_name_for};
use crate::pipeline::encode::{encode_jpeg, GrayscaleImage};
use crate::pipeline::grayscale;
use crate::pipeline::input::{read_source, CardSet, ImageSource};
use crate::slot::{PerSlot, Slot};
use chrono::Local;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate the sheet for a full set of six card images.
///
/// # Errors
/// - [`Card2PdfError::InvalidConfig`] if `config` is out of range (see
///   [`SheetConfig::validate`])
/// - [`Card2PdfError::MissingInput`] for the first empty slot, before any
///   file is touched
/// - [`Card2PdfError::Read`] / [`Card2PdfError::Decode`] /
///   [`Card2PdfError::Encode`] for the first slot that fails to convert
/// - [`Card2PdfError::Composition`] if the PDF cannot be assembled
pub async fn generate(
    cards: &CardSet,
    config: &SheetConfig,
) -> Result<GeneratedSheet, Card2PdfError> {
    let total_start = Instant::now();

    // ── Step 1: Validate config and selections ───────────────────────────
    config.validate()?;
    let sources = cards.validate()?;
    info!("Starting sheet generation ({} slots)", Slot::COUNT);

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(Slot::COUNT);
    }

    // ── Step 2: Convert all slots ────────────────────────────────────────
    let convert_start = Instant::now();
    let completed = AtomicUsize::new(0);
    let converted = convert_all(&sources, config, &completed).await;

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(Slot::COUNT, completed.load(Ordering::SeqCst));
    }

    let (images, input_bytes) = converted?;
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;
    info!("Converted {} images in {}ms", Slot::COUNT, convert_duration_ms);

    // ── Step 3: Compose the page ─────────────────────────────────────────
    let compose_start = Instant::now();
    let jpeg_bytes: u64 = images
        .iter()
        .filter_map(|(_, img)| img.as_ref())
        .map(|img| img.jpeg.len() as u64)
        .sum();

    let (pdf, placements) = tokio::task::spawn_blocking(move || compose_sheet(&images))
        .await
        .map_err(|e| Card2PdfError::Internal(format!("Compose task panicked: {}", e)))??;
    let compose_duration_ms = compose_start.elapsed().as_millis() as u64;

    // ── Step 4: Name the file ────────────────────────────────────────────
    let now = Local::now();
    let file_name = file_name_for(&now);

    let stats = SheetStats {
        input_bytes,
        jpeg_bytes,
        pdf_bytes: pdf.len() as u64,
        convert_duration_ms,
        compose_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Sheet complete: {} ({} bytes, {}ms total)",
        file_name, stats.pdf_bytes, stats.total_duration_ms
    );

    Ok(GeneratedSheet {
        file_name,
        pdf,
        placements,
        generated_at: now.to_rfc3339(),
        stats,
    })
}

/// Generate a sheet and save it inside `dir` under its generated file name.
///
/// The PDF is written to a temp file in `dir` and renamed into place, so a
/// failed run never leaves a truncated document behind.
pub async fn generate_to_dir(
    cards: &CardSet,
    dir: impl AsRef<Path>,
    config: &SheetConfig,
) -> Result<(GeneratedSheet, PathBuf), Card2PdfError> {
    let sheet = generate(cards, config).await?;
    let path = save_to_dir(&sheet, dir).await?;
    Ok((sheet, path))
}

/// Save an already generated sheet inside `dir` under its file name.
///
/// `dir` is created if needed. Returns the full path of the written file.
pub async fn save_to_dir(
    sheet: &GeneratedSheet,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, Card2PdfError> {
    let dir = dir.as_ref().to_path_buf();
    let path = dir.join(&sheet.file_name);

    let pdf = sheet.pdf.clone();
    let target = path.clone();
    tokio::task::spawn_blocking(move || write_atomic(&dir, &target, &pdf))
        .await
        .map_err(|e| Card2PdfError::Internal(format!("Write task panicked: {}", e)))??;

    info!("Saved {}", path.display());
    Ok(path)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    cards: &CardSet,
    config: &SheetConfig,
) -> Result<GeneratedSheet, Card2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Card2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(cards, config))
}

/// Convert one image to grayscale and return it as a JPEG data URL.
///
/// `slot` only tags errors and logs.
pub async fn grayscale_data_url(
    slot: Slot,
    source: &ImageSource,
    jpeg_quality: u8,
) -> Result<String, Card2PdfError> {
    let (img, _) = convert_slot(slot, source, jpeg_quality.clamp(1, 100)).await?;
    Ok(img.to_data_url())
}

/// Read, decode, gray and encode one slot.
///
/// Returns the encoded image and the number of input bytes read.
pub async fn convert_slot(
    slot: Slot,
    source: &ImageSource,
    jpeg_quality: u8,
) -> Result<(GrayscaleImage, u64), Card2PdfError> {
    let bytes = read_source(slot, source).await?;
    let input_len = bytes.len() as u64;

    let img = tokio::task::spawn_blocking(move || {
        let mut rgba = grayscale::decode(slot, &bytes)?;
        grayscale::to_grayscale(&mut rgba);
        encode_jpeg(slot, rgba, jpeg_quality)
    })
    .await
    .map_err(|e| Card2PdfError::Internal(format!("Conversion of {} panicked: {}", slot, e)))??;

    Ok((img, input_len))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Convert every slot, at most `config.concurrency` at a time.
///
/// Results arrive in completion order and are filed back under their slot.
/// The first error ends the run.
async fn convert_all(
    sources: &PerSlot<ImageSource>,
    config: &SheetConfig,
    completed: &AtomicUsize,
) -> Result<(PerSlot<Option<GrayscaleImage>>, u64), Card2PdfError> {
    let results: Vec<(GrayscaleImage, u64)> = stream::iter(sources.iter().map(|(slot, source)| {
        let source = source.clone();
        let quality = config.jpeg_quality;
        let cb = config.progress_callback.clone();
        async move {
            if let Some(ref cb) = cb {
                cb.on_slot_start(slot);
            }
            debug!("Converting {} from {}", slot, source.describe());
            let result = convert_slot(slot, &source, quality).await;
            match &result {
                Ok((img, _)) => {
                    completed.fetch_add(1, Ordering::SeqCst);
                    if let Some(ref cb) = cb {
                        cb.on_slot_complete(slot, img.jpeg.len());
                    }
                }
                Err(e) => {
                    warn!("Conversion failed for {}: {}", slot, e);
                    if let Some(ref cb) = cb {
                        cb.on_slot_error(slot, &e.to_string());
                    }
                }
            }
            result
        }
    }))
    .buffer_unordered(config.concurrency)
    .try_collect()
    .await?;

    let mut images: PerSlot<Option<GrayscaleImage>> = PerSlot::default();
    let mut input_bytes = 0;
    for (img, read) in results {
        input_bytes += read;
        let slot = img.slot;
        images[slot] = Some(img);
    }
    Ok((images, input_bytes))
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), Card2PdfError> {
    let write_err = |source: std::io::Error| Card2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(color: [u8; 4], w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba(color));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn convert_slot_turns_red_gray() {
        let source = ImageSource::bytes(png_bytes([255, 0, 0, 255], 6, 4));
        let (img, read) = convert_slot(Slot::StudentFront, &source, 100).await.unwrap();
        assert_eq!((img.width, img.height), (6, 4));
        assert!(read > 0);

        let decoded = image::load_from_memory(&img.jpeg).unwrap().into_rgb8();
        for px in decoded.pixels() {
            assert!(px[0].abs_diff(76) <= 2, "got {:?}", px);
            assert!(px[0].abs_diff(px[1]) <= 1 && px[1].abs_diff(px[2]) <= 1);
        }
    }

    #[tokio::test]
    async fn data_url_from_bytes() {
        let source = ImageSource::bytes(png_bytes([0, 0, 0, 255], 2, 2));
        let url = grayscale_data_url(Slot::GuardianBack, &source, 92).await.unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn missing_slot_stops_before_reading() {
        // The paths do not exist; validation must fail first.
        let cards = CardSet::new()
            .with(Slot::StudentFront, PathBuf::from("/nope/a.png"))
            .with(Slot::GuardianFront, PathBuf::from("/nope/b.png"));
        let err = generate(&cards, &SheetConfig::default()).await.unwrap_err();
        assert!(matches!(
            err,
            Card2PdfError::MissingInput { slot: Slot::StudentBack, .. }
        ));
    }

    #[tokio::test]
    async fn zero_concurrency_is_rejected_before_work() {
        let config = SheetConfig {
            concurrency: 0,
            ..SheetConfig::default()
        };
        let err = generate(&CardSet::new(), &config).await.unwrap_err();
        assert!(matches!(err, Card2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn write_atomic_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let path = nested.join("ID-test.pdf");
        write_atomic(&nested, &path, b"%PDF-1.5").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5");
        // Only the final file remains.
        assert_eq!(std::fs::read_dir(&nested).unwrap().count(), 1);
    }
}
