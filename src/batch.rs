//! Directory batch conversion.
//!
//! ## Resume by output
//!
//! A batch run converts every `*.pdf` in a directory, one document at a
//! time. A document counts as done when its `{stem}.md` exists in the output
//! directory. The Markdown file is only ever written after a successful
//! render, so rerunning a batch retries exactly the documents that failed
//! or were never reached.
//!
//! Use [`convert_dir`] for a finished [`BatchReport`], or
//! [`convert_dir_stream`] to observe each outcome as it is produced.

use crate::config::ConversionConfig;
use crate::convert::convert_document;
use crate::error::Pdf2MdError;
use crate::output::{BatchReport, DocumentOutcome};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of per-document outcomes, in processing order.
pub type DocumentStream = Pin<Box<dyn Stream<Item = (PathBuf, DocumentOutcome)> + Send>>;

/// List the PDFs in `source_dir` that still need converting.
///
/// Returns `(pending, skipped)`, both sorted by file name. With
/// `skip_existing` off, every PDF is pending.
pub fn pending_documents(
    source_dir: &Path,
    output_dir: &Path,
    skip_existing: bool,
) -> Result<(Vec<PathBuf>, Vec<PathBuf>), Pdf2MdError> {
    let entries = std::fs::read_dir(source_dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Pdf2MdError::PermissionDenied {
            path: source_dir.to_path_buf(),
        },
        _ => Pdf2MdError::FileNotFound {
            path: source_dir.to_path_buf(),
        },
    })?;

    let mut pdfs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_pdf(p))
        .collect();
    pdfs.sort();

    if !skip_existing {
        return Ok((pdfs, Vec::new()));
    }

    Ok(pdfs.into_iter().partition(|pdf| {
        let stem = pdf.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
        let mut md = stem;
        md.push(".md");
        !output_dir.join(md).is_file()
    }))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Convert every pending PDF in `source_dir` into `output_dir`, sequentially.
///
/// A failed document is recorded in the report and the batch continues.
///
/// # Errors
/// Only when `source_dir` cannot be listed.
pub async fn convert_dir(
    source_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, Pdf2MdError> {
    let source_dir = source_dir.as_ref();
    let output_dir = output_dir.as_ref();
    let (pending, skipped) = pending_documents(source_dir, output_dir, config.skip_existing)?;
    info!(
        "Batch {}: {} to convert, {} already done",
        source_dir.display(),
        pending.len(),
        skipped.len()
    );
    for path in &skipped {
        info!("Skipping {} (Markdown exists)", path.display());
    }

    let mut outcomes = Vec::with_capacity(pending.len());
    for pdf in &pending {
        let outcome = convert_document(pdf.to_string_lossy(), output_dir, config).await;
        if !outcome.is_success() {
            warn!("{} will be retried on the next run", pdf.display());
        }
        outcomes.push(outcome);
    }

    let report = BatchReport { skipped, outcomes };
    info!(
        "Batch complete: {} converted, {} failed, {} skipped",
        report.converted(),
        report.failed(),
        report.skipped.len()
    );
    Ok(report)
}

/// Like [`convert_dir`], but yields each outcome as soon as it is known.
///
/// Documents are still converted one at a time, in file-name order; the
/// next conversion starts only when the stream is polled again.
pub fn convert_dir_stream(
    source_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentStream, Pdf2MdError> {
    let output_dir = output_dir.as_ref().to_path_buf();
    let (pending, skipped) =
        pending_documents(source_dir.as_ref(), &output_dir, config.skip_existing)?;
    for path in &skipped {
        info!("Skipping {} (Markdown exists)", path.display());
    }

    let config = config.clone();
    let s = stream::iter(pending).then(move |pdf| {
        let cfg = config.clone();
        let out = output_dir.clone();
        async move {
            let outcome = convert_document(pdf.to_string_lossy(), &out, &cfg).await;
            (pdf, outcome)
        }
    });

    Ok(Box::pin(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"%PDF-1.4\n").unwrap();
    }

    #[test]
    fn pending_skips_converted_stems() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(&src.path().join("b.pdf"));
        touch(&src.path().join("a.PDF"));
        touch(&src.path().join("c.pdf"));
        std::fs::write(src.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(out.path().join("c.md"), b"# done").unwrap();

        let (pending, skipped) = pending_documents(src.path(), out.path(), true).unwrap();
        let names = |v: &[PathBuf]| -> Vec<String> {
            v.iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };
        assert_eq!(names(&pending), vec!["a.PDF", "b.pdf"]);
        assert_eq!(names(&skipped), vec!["c.pdf"]);

        let (all, none) = pending_documents(src.path(), out.path(), false).unwrap();
        assert_eq!(all.len(), 3);
        assert!(none.is_empty());
    }

    #[test]
    fn missing_source_dir() {
        let err = pending_documents(Path::new("/no/such/dir"), Path::new("."), true).unwrap_err();
        assert!(matches!(err, Pdf2MdError::FileNotFound { .. }));
    }

    #[test]
    fn empty_directory_gives_empty_report() {
        let src = tempfile::tempdir().unwrap();
        let report = tokio_test::block_on(convert_dir(
            src.path(),
            src.path(),
            &ConversionConfig::default(),
        ))
        .unwrap();
        assert!(report.outcomes.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn markdown_for_other_stem_does_not_skip() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(&src.path().join("report.pdf"));
        std::fs::write(out.path().join("report-old.md"), b"").unwrap();
        let (pending, skipped) = pending_documents(src.path(), out.path(), true).unwrap();
        assert_eq!(pending.len(), 1);
        assert!(skipped.is_empty());
    }
}
