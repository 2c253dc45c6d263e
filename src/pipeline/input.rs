//! Input handling: the six image selections and reading their bytes.
//!
//! A [`CardSet`] plays the role of the six upload controls. Each slot holds
//! at most one [`ImageSource`]; [`CardSet::validate`] checks that all six are
//! filled before any work starts, reporting the first empty slot in
//! canonical order.

use crate::error::Card2PdfError;
use crate::slot::{PerSlot, Slot};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a slot's image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on the local file system, read when the slot is converted.
    Path(PathBuf),
    /// Image bytes already in memory.
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageSource::Path(path.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        ImageSource::Bytes(bytes.into())
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(p) => p.display().to_string(),
            ImageSource::Bytes(b) => format!("<{} bytes in memory>", b.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// The six image selections of one sheet.
#[derive(Debug, Clone, Default)]
pub struct CardSet {
    sources: PerSlot<Option<ImageSource>>,
}

impl CardSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the image for `slot`.
    pub fn with(mut self, slot: Slot, source: impl Into<ImageSource>) -> Self {
        self.set(slot, source);
        self
    }

    pub fn set(&mut self, slot: Slot, source: impl Into<ImageSource>) {
        self.sources[slot] = Some(source.into());
    }

    pub fn clear(&mut self, slot: Slot) {
        self.sources[slot] = None;
    }

    pub fn get(&self, slot: Slot) -> Option<&ImageSource> {
        self.sources[slot].as_ref()
    }

    /// Number of slots that currently hold an image.
    pub fn filled(&self) -> usize {
        self.sources.iter().filter(|(_, s)| s.is_some()).count()
    }

    /// Check every slot is filled, reporting the first empty one.
    pub fn validate(&self) -> Result<PerSlot<ImageSource>, Card2PdfError> {
        self.sources.clone().transpose().map_err(Card2PdfError::missing)
    }
}

/// Fetch the raw bytes of a slot's image.
///
/// Any I/O failure (not found, permission denied, path is a directory) is a
/// [`Card2PdfError::Read`].
pub async fn read_source(slot: Slot, source: &ImageSource) -> Result<Vec<u8>, Card2PdfError> {
    match source {
        ImageSource::Bytes(bytes) => Ok(bytes.clone()),
        ImageSource::Path(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| Card2PdfError::Read {
                    slot,
                    path: path.clone(),
                    source,
                })?;
            debug!("Read {} bytes for {} from {}", bytes.len(), slot, path.display());
            Ok(bytes)
        }
    }
}
