//! Fixed sheet geometry.
//!
//! All values are millimetres with the origin at the top-left corner of the
//! page and y growing downward, the same convention the cards are measured
//! in. [`Rect::to_pdf_points`] flips into PDF user space when the composer
//! needs it.
//!
//! ```text
//!   x_start                    x_start + CARD_WIDTH + H_GAP
//!   ┌──────────────┐  5mm  ┌──────────────┐   y = 15
//!   │ Student back │       │ Student front│
//!   └──────────────┘       └──────────────┘
//!          10mm
//!   ┌──────────────┐       ┌──────────────┐   y = 15 + 63.98
//!   │ Guardian back│       │Guardian front│
//!   └──────────────┘       └──────────────┘
//!   ┌──────────────┐       ┌──────────────┐   y = 15 + 2 × 63.98
//!   │Guarantor back│       │Guarantor frnt│
//!   └──────────────┘       └──────────────┘
//! ```

use crate::slot::Slot;
use serde::{Deserialize, Serialize};

/// ISO/IEC 7810 ID-1 card width.
pub const CARD_WIDTH_MM: f64 = 85.6;
/// ISO/IEC 7810 ID-1 card height.
pub const CARD_HEIGHT_MM: f64 = 53.98;

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Gap between the back and front image of one card.
pub const H_GAP_MM: f64 = 5.0;
/// Gap between card rows.
pub const V_GAP_MM: f64 = 10.0;
/// Top margin of the first row.
pub const Y_START_MM: f64 = 15.0;

/// PDF points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Left edge of the back column; centres the two columns horizontally.
pub fn x_start() -> f64 {
    (A4_WIDTH_MM - (2.0 * CARD_WIDTH_MM + H_GAP_MM)) / 2.0
}

/// Top edge of row `row` (0-indexed).
pub fn row_top(row: usize) -> f64 {
    Y_START_MM + row as f64 * (CARD_HEIGHT_MM + V_GAP_MM)
}

/// Left edge of column `column` (0 = backs, 1 = fronts).
pub fn column_left(column: usize) -> f64 {
    x_start() + column as f64 * (CARD_WIDTH_MM + H_GAP_MM)
}

/// Axis-aligned rectangle in millimetres, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rectangle in PDF user space: points, bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Convert to PDF points on a page `page_height_mm` tall.
    pub fn to_pdf_points(&self, page_height_mm: f64) -> PdfRect {
        PdfRect {
            x: (self.x * PT_PER_MM) as f32,
            y: ((page_height_mm - self.y - self.height) * PT_PER_MM) as f32,
            width: (self.width * PT_PER_MM) as f32,
            height: (self.height * PT_PER_MM) as f32,
        }
    }
}

/// The target rectangle of `slot` on the sheet.
///
/// Images are stretched to fill it exactly; the source aspect ratio is not
/// preserved.
pub fn slot_rect(slot: Slot) -> Rect {
    let (row, column) = slot.grid_cell();
    Rect {
        x: column_left(column),
        y: row_top(row),
        width: CARD_WIDTH_MM,
        height: CARD_HEIGHT_MM,
    }
}

impl Slot {
    /// Shorthand for [`slot_rect`].
    pub fn rect(self) -> Rect {
        slot_rect(self)
    }
}
