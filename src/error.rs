//! Error types for the docling-pdf2md library.
//!
//! Every failure inside one document's conversion is fatal *to that
//! document*: the conversion engine rejecting the PDF, an image that cannot
//! be decoded, a write that fails. There is no partial output and no retry.
//!
//! * [`Pdf2MdError`] — returned as `Err(..)` from the `convert*` functions.
//! * [`FailureKind`] — coarse classification used by
//!   [`crate::output::DocumentOutcome::Failure`] so batch drivers can branch
//!   on the kind of failure without matching every variant.

use serde::{Deserialize, Serialize};
use std::error::Error as _;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docling-pdf2md library.
#[derive(Debug, Error)]
pub enum Pdf2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Conversion engine errors ──────────────────────────────────────────
    /// The document-conversion program could not be started.
    #[error(
        "Conversion engine '{program}' could not be started: {detail}\n\
Install docling (`pip install docling`) or point --engine / DOCLING_BIN at the executable."
    )]
    EngineNotFound { program: String, detail: String },

    /// The conversion engine ran but did not produce a document.
    #[error("Conversion engine failed on '{path}' ({status}):\n{stderr}")]
    EngineFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// The engine's document model could not be read.
    #[error("Invalid document model '{path}': {detail}")]
    InvalidDocumentModel { path: PathBuf, detail: String },

    // ── Image errors ──────────────────────────────────────────────────────
    /// A picture's pixel data could not be decoded.
    #[error("Failed to decode picture '{item}': {detail}")]
    ImageDecode { item: String, detail: String },

    /// A picture could not be encoded as JPEG.
    #[error("Failed to encode picture as JPEG: {source}")]
    ImageEncode {
        #[source]
        source: image::ImageError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the images directory or write an image file.
    #[error("Failed to write image '{path}': {source}")]
    ImageWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output Markdown file.
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

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2MdError {
    /// Classify the error for [`crate::output::DocumentOutcome`].
    pub fn kind(&self) -> FailureKind {
        match self {
            Pdf2MdError::FileNotFound { .. }
            | Pdf2MdError::PermissionDenied { .. }
            | Pdf2MdError::InvalidInput { .. }
            | Pdf2MdError::DownloadFailed { .. }
            | Pdf2MdError::DownloadTimeout { .. }
            | Pdf2MdError::NotAPdf { .. } => FailureKind::Input,
            Pdf2MdError::EngineNotFound { .. }
            | Pdf2MdError::EngineFailed { .. }
            | Pdf2MdError::InvalidDocumentModel { .. }
            | Pdf2MdError::ImageDecode { .. }
            | Pdf2MdError::ImageEncode { .. } => FailureKind::Conversion,
            Pdf2MdError::ImageWriteFailed { .. } | Pdf2MdError::OutputWriteFailed { .. } => {
                FailureKind::Io
            }
            Pdf2MdError::InvalidConfig(_) => FailureKind::Config,
            Pdf2MdError::Internal(_) => FailureKind::Internal,
        }
    }

    /// Render the `source()` chain below this error, one cause per line.
    ///
    /// Empty when the error has no underlying cause.
    pub fn cause_chain(&self) -> String {
        let mut lines = Vec::new();
        let mut current = self.source();
        while let Some(err) = current {
            lines.push(format!("caused by: {err}"));
            current = err.source();
        }
        lines.join("\n")
    }
}

/// Coarse failure classification for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The source could not be located, read, or downloaded.
    Input,
    /// The engine or picture decoding failed.
    Conversion,
    /// Writing images or the Markdown file failed.
    Io,
    /// The configuration was rejected.
    Config,
    /// Anything else.
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Input => "input",
            FailureKind::Conversion => "conversion",
            FailureKind::Io => "io",
            FailureKind::Config => "config",
            FailureKind::Internal => "internal",
        };
        f.write_str(s)
    }
}
