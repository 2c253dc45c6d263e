//! Progress-callback trait for per-slot generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::SheetConfigBuilder::progress_callback`] to receive events
//! while the six images are converted. The CLI drives its progress bar from
//! this trait; a GUI host would flip its button label from here.
//!
//! # Example
//!
//! ```rust
//! use card2pdf::{GenerationProgressCallback, SheetConfig, Slot};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_slot_complete(&self, slot: Slot, jpeg_len: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{slot} done ({jpeg_len} bytes), {done}/6");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = SheetConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::slot::Slot;
use std::sync::Arc;

/// Called by the pipeline as it processes each slot.
///
/// Slots are converted concurrently, so `on_slot_*` may be called from
/// different threads and in any order. All methods default to no-ops.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once, after input validation and before any image is read.
    fn on_generation_start(&self, total_slots: usize) {
        let _ = total_slots;
    }

    /// Called when a slot's conversion task starts.
    fn on_slot_start(&self, slot: Slot) {
        let _ = slot;
    }

    /// Called when a slot has been converted.
    ///
    /// `jpeg_len` is the byte size of the re-encoded grayscale image.
    fn on_slot_complete(&self, slot: Slot, jpeg_len: usize) {
        let _ = (slot, jpeg_len);
    }

    /// Called when a slot fails. The run aborts after this.
    fn on_slot_error(&self, slot: Slot, error: &str) {
        let _ = (slot, error);
    }

    /// Called once when the run ends, successfully or not.
    ///
    /// `success_count` is the number of slots converted before the run ended.
    fn on_generation_complete(&self, total_slots: usize, success_count: usize) {
        let _ = (total_slots, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SheetConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errored: Mutex<Vec<Slot>>,
        final_success: AtomicUsize,
    }

    impl GenerationProgressCallback for TrackingCallback {
        fn on_slot_start(&self, _slot: Slot) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_slot_complete(&self, _slot: Slot, _jpeg_len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_slot_error(&self, slot: Slot, _error: &str) {
            self.errored.lock().unwrap().push(slot);
        }

        fn on_generation_complete(&self, _total: usize, success_count: usize) {
            self.final_success.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_generation_start(6);
        cb.on_slot_start(Slot::StudentFront);
        cb.on_slot_complete(Slot::StudentFront, 42);
        cb.on_slot_error(Slot::GuardianBack, "bad image");
        cb.on_generation_complete(6, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_slot_start(Slot::StudentFront);
        tracker.on_slot_complete(Slot::StudentFront, 100);
        tracker.on_slot_start(Slot::StudentBack);
        tracker.on_slot_error(Slot::StudentBack, "not an image");
        tracker.on_generation_complete(6, 1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(*tracker.errored.lock().unwrap(), vec![Slot::StudentBack]);
        assert_eq!(tracker.final_success.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_generation_start(6);
        cb.on_slot_complete(Slot::GuarantorFront, 512);
    }
}
