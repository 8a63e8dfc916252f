//! # docling-pdf2md
//!
//! Convert PDF documents to Markdown with docling, extracting figures as
//! content-addressed JPEG files.
//!
//! ## Why this crate?
//!
//! docling already does the hard part: layout analysis, reading order, OCR
//! and table structure. What it leaves to the caller is turning its document
//! tree into a Markdown file that is pleasant to keep in a repository: one
//! `.md` per PDF, figures in an `images/` directory named by the SHA-256 of
//! their JPEG bytes (so identical figures share a file and reruns never
//! rename anything), and small decorative pictures dropped.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     resolve local file, docling JSON, or download from URL
//!  ├─ 2. Engine    docling → document tree → reading order (spawn_blocking)
//!  ├─ 3. Walk      one pass over the reading order
//!  ├─ 4. Render    heading / text / list / table / picture → fragment
//!  ├─ 5. Images    size filter, JPEG, sha256[..16].jpg
//!  └─ 6. Output    {stem}.md written atomically + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docling_pdf2md::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Runs `docling` from PATH (or $DOCLING_BIN)
//!     let config = ConversionConfig::default();
//!     let output = convert("paper.pdf", "out", &config).await?;
//!     eprintln!("{} images → {}",
//!         output.stats.images,
//!         output.markdown_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! docling-pdf2md = { version = "0.1", default-features = false }
//! ```
//!
//! ## Presets
//!
//! | Preset | OCR | Threads | Min picture side |
//! |--------|-----|---------|------------------|
//! | [`ConversionConfig::parse_preset`] (default) | off | 4 | 200 px |
//! | [`ConversionConfig::ocr_preset`] | ja-JP, en-US | 8 | 300 px |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{convert_dir, convert_dir_stream, pending_documents, DocumentStream};
pub use config::{
    AcceleratorDevice, ConversionConfig, ConversionConfigBuilder, OcrEngine, PipelineOptions,
    TableMode,
};
pub use convert::{convert, convert_document, convert_sync, render_document};
pub use engine::{DoclingCli, DocumentEngine, JsonExport};
pub use error::{FailureKind, Pdf2MdError};
pub use model::{DocumentModel, Element, OrderedElement, Picture, MAX_HEADING_LEVEL};
pub use output::{BatchReport, ConversionOutput, ConversionStats, DocumentOutcome};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
