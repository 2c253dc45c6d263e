//! Result types returned by a successful generation.

use crate::pipeline::compose::Placement;
use crate::slot::PerSlot;
use serde::Serialize;

/// A finished sheet.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSheet {
    /// `ID-<YYYY-MM-DD>-<epoch-seconds>.pdf`.
    pub file_name: String,
    /// The PDF document.
    #[serde(skip)]
    pub pdf: Vec<u8>,
    /// Where each slot's image was drawn.
    pub placements: PerSlot<Placement>,
    /// Wall-clock time the sheet was generated, RFC 3339.
    pub generated_at: String,
    pub stats: SheetStats,
}

/// Timings and sizes for one generation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SheetStats {
    /// Bytes read across all six inputs.
    pub input_bytes: u64,
    /// Bytes of JPEG embedded across all six slots.
    pub jpeg_bytes: u64,
    /// Size of the final PDF.
    pub pdf_bytes: u64,
    pub convert_duration_ms: u64,
    pub compose_duration_ms: u64,
    pub total_duration_ms: u64,
}
