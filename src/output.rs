//! Output types returned by the conversion entry points.

use crate::error::{FailureKind, Pdf2MdError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Artifacts and statistics of one successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// `{output_dir}/{stem}.md`
    pub markdown_path: PathBuf,
    /// `{output_dir}/{images_subdir}`; exists only if a picture was accepted.
    pub images_dir: PathBuf,
    /// The Markdown that was written.
    #[serde(skip_serializing)]
    pub markdown: String,
    pub stats: ConversionStats,
}

/// Counters and timings for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Elements in the reading order, groups included.
    pub elements: usize,
    /// Fragments written to the Markdown file.
    pub fragments: usize,
    pub headings: usize,
    pub tables: usize,
    /// Pictures accepted and linked (the last figure number).
    pub images: usize,
    /// Pictures dropped by the minimum-size filter.
    pub skipped_images: usize,
    /// Accepted pictures whose content had already been written this run.
    pub duplicate_images: usize,
    /// Elements with no rendering rule.
    pub unhandled_elements: usize,
    /// Wall-clock time for the whole conversion.
    pub total_duration_ms: u64,
    /// Time spent inside the conversion engine.
    pub engine_duration_ms: u64,
    /// Time spent walking, rendering and writing.
    pub render_duration_ms: u64,
}

/// Per-document result: success with artifacts, or a classified failure.
///
/// A batch driver branches on this rather than on propagated errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Success {
        source: PathBuf,
        markdown_path: PathBuf,
        images_dir: PathBuf,
        stats: ConversionStats,
    },
    Failure {
        source: PathBuf,
        kind: FailureKind,
        message: String,
        /// Rendered `source()` chain; empty when there is none.
        cause: String,
    },
}

impl DocumentOutcome {
    pub fn success(source: &Path, output: &ConversionOutput) -> Self {
        DocumentOutcome::Success {
            source: source.to_path_buf(),
            markdown_path: output.markdown_path.clone(),
            images_dir: output.images_dir.clone(),
            stats: output.stats,
        }
    }

    pub fn failure(source: &Path, error: &Pdf2MdError) -> Self {
        DocumentOutcome::Failure {
            source: source.to_path_buf(),
            kind: error.kind(),
            message: error.to_string(),
            cause: error.cause_chain(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DocumentOutcome::Success { .. })
    }

    pub fn source(&self) -> &Path {
        match self {
            DocumentOutcome::Success { source, .. } | DocumentOutcome::Failure { source, .. } => {
                source
            }
        }
    }
}

/// Summary of a batch run over a directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Sources skipped because their Markdown already existed.
    pub skipped: Vec<PathBuf>,
    /// One outcome per attempted source, in processing order.
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_outcome_carries_kind_and_cause() {
        let err = Pdf2MdError::OutputWriteFailed {
            path: PathBuf::from("out/a.md"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let outcome = DocumentOutcome::failure(Path::new("a.pdf"), &err);
        assert!(!outcome.is_success());
        assert_eq!(outcome.source(), Path::new("a.pdf"));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "io");
        assert_eq!(json["cause"], "caused by: disk full");
    }

    #[test]
    fn batch_report_counts() {
        let ok = DocumentOutcome::Success {
            source: "a.pdf".into(),
            markdown_path: "out/a.md".into(),
            images_dir: "out/images".into(),
            stats: ConversionStats::default(),
        };
        let bad = DocumentOutcome::failure(
            Path::new("b.pdf"),
            &Pdf2MdError::Internal("boom".into()),
        );
        let report = BatchReport {
            skipped: vec!["c.pdf".into()],
            outcomes: vec![ok, bad],
        };
        assert_eq!(report.converted(), 1);
        assert_eq!(report.failed(), 1);
    }
}
