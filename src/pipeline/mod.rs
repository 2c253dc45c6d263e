//! Pipeline stages for turning six card images into one sheet.
//!
//! Each submodule implements exactly one step and can be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ grayscale ──▶ encode ──▶ compose
//! (bytes)    (luma)        (JPEG)     (A4 PDF)
//! ```
//!
//! 1. [`input`]    : the six selections; validation and reading file bytes
//! 2. [`grayscale`]: decode to RGBA8 and apply the luminosity transform
//! 3. [`encode`]   : JPEG-encode the grayscale buffer, optional data URL
//! 4. [`compose`]  : place the six JPEGs on one page and name the file
//!
//! Steps 1–3 run once per slot, concurrently; step 4 waits for all six.

pub mod compose;
pub mod encode;
pub mod grayscale;
pub mod input;
