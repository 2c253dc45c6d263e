//! Configuration types for sheet generation.
//!
//! The page layout is fixed (see [`crate::layout`]); what can be tuned is how
//! the images are processed. [`SheetConfig`] is built via its
//! [`SheetConfigBuilder`], which clamps each value into range.

use crate::error::Card2PdfError;
use crate::progress::ProgressCallback;
use crate::slot::Slot;
use std::fmt;

/// Default JPEG quality for the re-encoded grayscale images.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Configuration for generating one sheet.
///
/// # Example
/// ```rust
/// use card2pdf::SheetConfig;
///
/// let config = SheetConfig::builder()
///     .jpeg_quality(85)
///     .concurrency(3)
///     .build()
///     .unwrap();
/// assert_eq!(config.jpeg_quality, 85);
/// ```
#[derive(Clone)]
pub struct SheetConfig {
    /// JPEG quality of each embedded image. Range: 1–100. Default: 92.
    ///
    /// Every image is stretched onto an 85.6 × 53.98 mm rectangle, so quality
    /// mostly governs file size. Lower it if the PDF is too large to send.
    pub jpeg_quality: u8,

    /// Maximum number of slots converted at the same time. Range: 1–6. Default: 6.
    pub concurrency: usize,

    /// Optional progress receiver.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            concurrency: Slot::COUNT,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SheetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetConfig")
            .field("jpeg_quality", &self.jpeg_quality)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl SheetConfig {
    /// Create a new builder for `SheetConfig`.
    pub fn builder() -> SheetConfigBuilder {
        SheetConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the value ranges.
    ///
    /// The builder setters already clamp, so this only fails for a config
    /// assembled by hand through the public fields.
    pub fn validate(&self) -> Result<(), Card2PdfError> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(Card2PdfError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                self.jpeg_quality
            )));
        }
        if self.concurrency == 0 {
            return Err(Card2PdfError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`SheetConfig`].
pub struct SheetConfigBuilder {
    config: SheetConfig,
}

impl SheetConfigBuilder {
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.clamp(1, Slot::COUNT);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration.
    ///
    /// Every setter clamps its value into range, so a builder-made config
    /// always passes [`SheetConfig::validate`] and this returns `Ok`.
    pub fn build(self) -> Result<SheetConfig, Card2PdfError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
