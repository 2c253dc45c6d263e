//! The generate trigger: one activation per sheet, with a status line.
//!
//! [`GenerateTrigger`] models the "Download PDF" control of an upload form.
//! An activation clears the status line, marks the trigger busy, runs
//! [`generate`], and on failure writes one user-facing message into the
//! status line. The trigger is put back to [`TriggerState::Ready`] on every
//! exit path by a drop guard, so a failed or panicking run never leaves it
//! stuck.

use crate::config::SheetConfig;
use crate::error::Card2PdfError;
use crate::generate::generate;
use crate::output::GeneratedSheet;
use crate::pipeline::input::CardSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::error;

/// Visible state of the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Ready,
    Busy,
}

impl TriggerState {
    /// Label shown on the control in this state.
    pub fn label(self) -> &'static str {
        match self {
            TriggerState::Ready => "Download PDF",
            TriggerState::Busy => "Preparing…",
        }
    }
}

/// A single generate control plus its status line.
#[derive(Debug, Default)]
pub struct GenerateTrigger {
    busy: AtomicBool,
    status: Mutex<Option<String>>,
}

/// Resets the trigger to ready when dropped.
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl GenerateTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TriggerState {
        if self.busy.load(Ordering::SeqCst) {
            TriggerState::Busy
        } else {
            TriggerState::Ready
        }
    }

    /// The current status-line message, if any.
    pub fn status(&self) -> Option<String> {
        self.status.lock().ok().and_then(|s| s.clone())
    }

    fn set_status(&self, message: Option<String>) {
        if let Ok(mut status) = self.status.lock() {
            *status = message;
        }
    }

    /// Run one generation.
    ///
    /// Returns [`Card2PdfError::Busy`] without touching the status line if a
    /// previous activation is still running. Every other error is logged,
    /// turned into its user message in [`status`](Self::status), and
    /// returned.
    pub async fn activate(
        &self,
        cards: &CardSet,
        config: &SheetConfig,
    ) -> Result<GeneratedSheet, Card2PdfError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Card2PdfError::Busy);
        }
        let _guard = BusyGuard { busy: &self.busy };

        self.set_status(None);

        let result = generate(cards, config).await;

        if let Err(ref e) = result {
            if !e.is_missing_input() {
                error!("Error generating PDF: {}", e);
            }
            self.set_status(Some(e.user_message()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{missing_input_message, GENERIC_FAILURE_MESSAGE};
    use crate::slot::Slot;

    #[test]
    fn labels() {
        assert_eq!(TriggerState::Ready.label(), "Download PDF");
        assert_eq!(TriggerState::Busy.label(), "Preparing…");
    }

    #[tokio::test]
    async fn empty_set_sets_missing_message_and_resets() {
        let trigger = GenerateTrigger::new();
        let err = trigger
            .activate(&CardSet::new(), &SheetConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_missing_input());
        assert_eq!(
            trigger.status().as_deref(),
            Some(missing_input_message(Slot::StudentFront).as_str())
        );
        assert_eq!(trigger.state(), TriggerState::Ready);
    }

    #[tokio::test]
    async fn bad_bytes_set_generic_message() {
        let cards = Slot::ALL
            .iter()
            .fold(CardSet::new(), |set, &slot| set.with(slot, b"junk".to_vec()));
        let trigger = GenerateTrigger::new();
        trigger
            .activate(&cards, &SheetConfig::default())
            .await
            .unwrap_err();
        assert_eq!(trigger.status().as_deref(), Some(GENERIC_FAILURE_MESSAGE));
        assert_eq!(trigger.state(), TriggerState::Ready);
    }

    #[tokio::test]
    async fn busy_trigger_refuses_second_activation() {
        let trigger = GenerateTrigger::new();
        trigger.busy.store(true, Ordering::SeqCst);
        trigger.set_status(Some("previous".into()));

        let err = trigger
            .activate(&CardSet::new(), &SheetConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Card2PdfError::Busy));
        // The running activation's state is left alone.
        assert_eq!(trigger.status().as_deref(), Some("previous"));
        assert_eq!(trigger.state(), TriggerState::Busy);
    }
}
