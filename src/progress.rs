//! Progress-callback trait for per-document conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline converts a document: start, each table, each saved
//! or skipped picture, and the final outcome.
//!
//! # Example
//!
//! ```rust
//! use docling_pdf2md::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_image_saved(&self, counter: usize, filename: &str) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("figure {counter} → {filename}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { saved: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::Pdf2MdError;
use crate::output::ConversionStats;
use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes a document.
///
/// Rendering runs on a blocking worker thread, hence `Send + Sync`. All
/// methods have default no-op implementations so callers only override what
/// they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the engine is invoked.
    fn on_conversion_start(&self, source: &Path) {
        let _ = source;
    }

    /// Called after each table fragment is produced (1-based count).
    fn on_table_rendered(&self, index: usize) {
        let _ = index;
    }

    /// Called after a picture is accepted; `counter` is its figure number.
    fn on_image_saved(&self, counter: usize, filename: &str) {
        let _ = (counter, filename);
    }

    /// Called when a picture is below the size threshold.
    fn on_image_skipped(&self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called once after the Markdown file has been written.
    fn on_conversion_complete(&self, source: &Path, stats: &ConversionStats) {
        let _ = (source, stats);
    }

    /// Called once when the conversion fails; no Markdown was written.
    fn on_conversion_error(&self, source: &Path, error: &Pdf2MdError) {
        let _ = (source, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        tables: AtomicUsize,
        saved: AtomicUsize,
        skipped: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_table_rendered(&self, _index: usize) {
            self.tables.fetch_add(1, Ordering::SeqCst);
        }
        fn on_image_saved(&self, _counter: usize, _filename: &str) {
            self.saved.fetch_add(1, Ordering::SeqCst);
        }
        fn on_image_skipped(&self, _w: u32, _h: u32) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoopProgressCallback>();
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(Path::new("x.pdf"));
        cb.on_image_saved(1, "abc.jpg");
    }

    #[test]
    fn tracking_callback_counts() {
        let cb = TrackingCallback {
            tables: AtomicUsize::new(0),
            saved: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        };
        cb.on_table_rendered(1);
        cb.on_image_saved(1, "a.jpg");
        cb.on_image_saved(2, "b.jpg");
        cb.on_image_skipped(10, 10);
        assert_eq!(cb.tables.load(Ordering::SeqCst), 1);
        assert_eq!(cb.saved.load(Ordering::SeqCst), 2);
        assert_eq!(cb.skipped.load(Ordering::SeqCst), 1);
    }
}
