//! Error types for the card2pdf library.
//!
//! A sheet is all-or-nothing: if any one of the six images fails, no document
//! is produced. A single error enum, [`Card2PdfError`], covers every way a
//! run can stop, and carries the [`Slot`] involved where there is one so
//! logs can point at the offending upload.
//!
//! Users see far less detail than the logs. [`Card2PdfError::user_message`]
//! reduces every error to one of two fixed messages: "this slot is empty" or
//! a generic "something went wrong".

use crate::slot::Slot;
use std::path::PathBuf;
use thiserror::Error;

/// Generic failure text shown for every error other than a missing input.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong. Make sure every selection is an image file and not some other file picked by mistake.";

/// Text shown when a slot has no image, naming the slot.
pub fn missing_input_message(slot: Slot) -> String {
    format!("You forgot the {} image. Go upload it.", slot.label())
}

/// All errors returned by the card2pdf library.
#[derive(Debug, Error)]
pub enum Card2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A required slot has no image selected.
    #[error("No image selected for the {label}")]
    MissingInput { slot: Slot, label: &'static str },

    /// The image file could not be read at all.
    #[error("Failed to read {slot} image '{path}': {source}")]
    Read {
        slot: Slot,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes were read but are not a decodable image.
    #[error("The {slot} upload is not a readable image: {detail}")]
    Decode { slot: Slot, detail: String },

    /// Re-encoding the grayscale buffer failed.
    #[error("Failed to encode the {slot} image: {detail}")]
    Encode { slot: Slot, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Building the PDF failed after all conversions succeeded.
    #[error("PDF composition failed: {0}")]
    Composition(String),

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Trigger errors ────────────────────────────────────────────────────
    /// A generation is already running on this trigger.
    #[error("A sheet is already being generated")]
    Busy,

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Card2PdfError {
    pub fn missing(slot: Slot) -> Self {
        Card2PdfError::MissingInput {
            slot,
            label: slot.label(),
        }
    }

    /// The slot this error is about, if any.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Card2PdfError::MissingInput { slot, .. }
            | Card2PdfError::Read { slot, .. }
            | Card2PdfError::Decode { slot, .. }
            | Card2PdfError::Encode { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    pub fn is_missing_input(&self) -> bool {
        matches!(self, Card2PdfError::MissingInput { .. })
    }

    /// The message shown to the user in the status area.
    pub fn user_message(&self) -> String {
        match self {
            Card2PdfError::MissingInput { slot, .. } => missing_input_message(*slot),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_names_slot() {
        let e = Card2PdfError::missing(Slot::GuardianBack);
        assert!(e.to_string().contains("guardian card (back)"));
        assert!(e.user_message().contains("guardian card (back)"));
        assert_eq!(e.slot(), Some(Slot::GuardianBack));
        assert!(e.is_missing_input());
    }

    #[test]
    fn decode_error_collapses_to_generic_message() {
        let e = Card2PdfError::Decode {
            slot: Slot::StudentFront,
            detail: "unsupported format".into(),
        };
        assert!(e.to_string().contains("student-front"));
        assert_eq!(e.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn read_error_display_includes_path() {
        let e = Card2PdfError::Read {
            slot: Slot::GuarantorBack,
            path: PathBuf::from("/nope/back.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/nope/back.png"), "got: {msg}");
        assert_eq!(e.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn composition_error_has_no_slot() {
        let e = Card2PdfError::Composition("boom".into());
        assert_eq!(e.slot(), None);
        assert!(!e.is_missing_input());
        assert_eq!(e.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
