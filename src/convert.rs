//! Per-document conversion entry points.
//!
//! ## Why two layers?
//!
//! [`render_document`] is the synchronous core: it takes a finished
//! [`DocumentModel`] and produces `{stem}.md` plus the image directory. It
//! knows nothing about docling, URLs or async, which is what makes it easy
//! to test with hand-built models.
//!
//! [`convert`] wraps it with everything around the core: resolving the input,
//! running the engine on a blocking thread, timing, progress callbacks.
//! [`convert_document`] turns the `Result` into a [`DocumentOutcome`] for
//! batch drivers.

use crate::config::ConversionConfig;
use crate::engine::resolve_engine;
use crate::error::Pdf2MdError;
use crate::model::DocumentModel;
use crate::output::{ConversionOutput, ConversionStats, DocumentOutcome};
use crate::pipeline::{assemble, images::ImageStore, input, render::ElementRenderer, walk};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Render a document model into `{output_dir}/{stem}.md`.
///
/// Pictures are written to `{output_dir}/{images_subdir}` as they are met;
/// the Markdown file is written last, so a failure part-way leaves no `.md`.
/// The returned stats carry counters and the render time only.
pub fn render_document(
    model: DocumentModel,
    output_dir: &Path,
    stem: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    let start = Instant::now();
    let images_dir = output_dir.join(&config.images_subdir);
    let markdown_path = output_dir.join(format!("{stem}.md"));

    let store = ImageStore::new(&images_dir, config.min_image_side, config.jpeg_quality);
    let mut renderer = ElementRenderer::new(store, &config.images_subdir, &config.figure_label)
        .with_progress(config.progress_callback.clone());

    let elements = model.len();
    let fragments = walk::walk(model.into_reading_order(), &mut renderer)?;
    let markdown = assemble::assemble(&fragments);
    assemble::write_markdown(&markdown_path, &markdown)?;

    let counters = renderer.counters();
    let stats = ConversionStats {
        elements,
        fragments: fragments.len(),
        headings: counters.headings,
        tables: counters.tables,
        images: counters.images,
        skipped_images: counters.skipped_images,
        duplicate_images: counters.duplicate_images,
        unhandled_elements: counters.unhandled,
        render_duration_ms: start.elapsed().as_millis() as u64,
        ..ConversionStats::default()
    };

    Ok(ConversionOutput {
        markdown_path,
        images_dir,
        markdown,
        stats,
    })
}

/// Convert a PDF file or URL to Markdown in `output_dir`.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input` — Local file path, HTTP/HTTPS URL, or docling `.json` export
/// * `output_dir` — Directory receiving `{stem}.md` and the image directory
/// * `config` — Conversion configuration
///
/// # Errors
/// Any failure is fatal to the document: the engine could not run or
/// rejected the file, a picture could not be decoded or written, or the
/// Markdown write failed. No `.md` file exists after an error.
pub async fn convert(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    let output_dir = output_dir.as_ref().to_path_buf();
    info!("Starting conversion: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let source = resolved.path().to_path_buf();
    let stem = resolved.stem();

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(&source);
    }

    // ── Step 2: Run the engine ───────────────────────────────────────────
    let engine = resolve_engine(config, &source);
    info!("Converting {} with {}", source.display(), engine.name());
    let engine_start = Instant::now();
    let model = {
        let source = source.clone();
        let options = config.pipeline.clone();
        tokio::task::spawn_blocking(move || engine.convert(&source, &options))
            .await
            .map_err(|e| Pdf2MdError::Internal(format!("engine task failed: {e}")))??
    };
    let engine_duration_ms = engine_start.elapsed().as_millis() as u64;
    info!(
        "Engine produced {} elements in {}ms",
        model.len(),
        engine_duration_ms
    );
    if model.is_empty() {
        warn!("{} has no body content; writing an empty Markdown file", source.display());
    }

    // ── Step 3: Render + write ───────────────────────────────────────────
    let mut output = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || render_document(model, &output_dir, &stem, &config))
            .await
            .map_err(|e| Pdf2MdError::Internal(format!("render task failed: {e}")))??
    };
    // `resolved` (and any downloaded temp file) lives until here.
    drop(resolved);

    // ── Step 4: Stats ────────────────────────────────────────────────────
    output.stats.engine_duration_ms = engine_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {} ({} images, {} skipped, {} tables) in {:.2}s",
        output.markdown_path.display(),
        output.stats.images,
        output.stats.skipped_images,
        output.stats.tables,
        output.stats.total_duration_ms as f64 / 1000.0
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(&source, &output.stats);
    }

    Ok(output)
}

/// Convert one document and report the result as a [`DocumentOutcome`].
///
/// Errors are logged with their full cause chain and handed to the progress
/// callback; they never propagate, so a batch can move on.
pub async fn convert_document(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> DocumentOutcome {
    let input_str = input_str.as_ref();
    let source = PathBuf::from(input_str);
    match convert(input_str, output_dir, config).await {
        Ok(output) => DocumentOutcome::success(&source, &output),
        Err(e) => {
            let chain = e.cause_chain();
            if chain.is_empty() {
                error!("Conversion failed for {}: {}", input_str, e);
            } else {
                error!("Conversion failed for {}: {}\n{}", input_str, e, chain);
            }
            if let Some(ref cb) = config.progress_callback {
                cb.on_conversion_error(&source, &e);
            }
            DocumentOutcome::failure(&source, &e)
        }
    }
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, output_dir, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineOptions;
    use crate::engine::DocumentEngine;
    use crate::model::{Element, Picture};
    use crate::pipeline::encode::{content_id, encode_jpeg};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::sync::Arc;

    fn gradient(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    #[test]
    fn render_document_writes_markdown_and_images() {
        let tmp = tempfile::tempdir().unwrap();
        let img = gradient(300, 240);
        let expected = format!("{}.jpg", content_id(&encode_jpeg(&img, 75).unwrap()));

        let model = DocumentModel::new("doc")
            .with(Element::Heading {
                level: 1,
                text: "Intro".into(),
            })
            .with(Element::Picture(Picture::new(gradient(50, 400))))
            .with(Element::Picture(Picture::new(img)))
            .with(Element::Other {
                label: "form".into(),
            });

        let config = ConversionConfig::default();
        let out = render_document(model, tmp.path(), "doc", &config).unwrap();

        assert_eq!(
            out.markdown,
            format!("\n# Intro\n\n![図1](images/{expected})\n")
        );
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("doc.md")).unwrap(),
            out.markdown
        );
        assert!(tmp.path().join("images").join(&expected).is_file());
        assert_eq!(out.stats.elements, 4);
        assert_eq!(out.stats.fragments, 2);
        assert_eq!(out.stats.images, 1);
        assert_eq!(out.stats.skipped_images, 1);
        assert_eq!(out.stats.unhandled_elements, 1);
    }

    #[test]
    fn render_failure_leaves_no_markdown() {
        let tmp = tempfile::tempdir().unwrap();
        // A file where the images directory should go makes the image write fail.
        std::fs::write(tmp.path().join("images"), b"not a dir").unwrap();
        let model = DocumentModel::new("doc")
            .with(Element::Paragraph {
                text: "before".into(),
            })
            .with(Element::Picture(Picture::new(gradient(256, 256))));

        let err = render_document(model, tmp.path(), "doc", &ConversionConfig::default())
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::ImageWriteFailed { .. }));
        assert!(!tmp.path().join("doc.md").exists());
    }

    struct Failing;

    impl DocumentEngine for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn convert(&self, source: &Path, _: &PipelineOptions) -> Result<DocumentModel, Pdf2MdError> {
            Err(Pdf2MdError::EngineFailed {
                path: source.to_path_buf(),
                status: "exit status: 1".into(),
                stderr: "corrupt xref table".into(),
            })
        }
    }

    #[tokio::test]
    async fn convert_document_reports_engine_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("broken.pdf");
        std::fs::write(&pdf, b"%PDF-1.7\n").unwrap();
        let config = ConversionConfig::builder()
            .engine(Arc::new(Failing))
            .build()
            .unwrap();

        let outcome = convert_document(pdf.to_str().unwrap(), tmp.path(), &config).await;
        match outcome {
            DocumentOutcome::Failure { kind, message, .. } => {
                assert_eq!(kind, crate::error::FailureKind::Conversion);
                assert!(message.contains("corrupt xref table"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!tmp.path().join("broken.md").exists());
    }
}
