//! # card2pdf
//!
//! Put the front and back of three ID cards (student, guardian, guarantor)
//! on one grayscale A4 sheet, ready to print or send.
//!
//! ## Pipeline Overview
//!
//! ```text
//! six images
//!  │
//!  ├─ 1. Input      check all six slots are filled (first gap is reported)
//!  ├─ 2. Grayscale  decode + BT.601 luma per pixel (spawn_blocking, concurrent)
//!  ├─ 3. Encode     JPEG, same pixel size as the upload
//!  ├─ 4. Compose    six fixed 85.6 × 53.98 mm slots on an A4 page (lopdf)
//!  └─ 5. Output     ID-<YYYY-MM-DD>-<epoch>.pdf
//! ```
//!
//! Any failure aborts the run; no partial sheet is ever produced.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use card2pdf::{generate_to_dir, CardSet, SheetConfig, Slot};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cards = Slot::ALL.iter().fold(CardSet::new(), |set, &slot| {
//!         set.with(slot, PathBuf::from(format!("scans/{}.jpg", slot.key())))
//!     });
//!     let (sheet, path) = generate_to_dir(&cards, ".", &SheetConfig::default()).await?;
//!     eprintln!("wrote {} ({} bytes)", path.display(), sheet.stats.pdf_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `card2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod slot;
pub mod trigger;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SheetConfig, SheetConfigBuilder};
pub use error::{Card2PdfError, GENERIC_FAILURE_MESSAGE};
pub use generate::{generate, generate_sync, generate_to_dir, grayscale_data_url, save_to_dir};
pub use layout::Rect;
pub use output::{GeneratedSheet, SheetStats};
pub use pipeline::compose::{file_name_for, Placement};
pub use pipeline::encode::GrayscaleImage;
pub use pipeline::input::{CardSet, ImageSource};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use slot::{Holder, PerSlot, Side, Slot};
pub use trigger::{GenerateTrigger, TriggerState};
