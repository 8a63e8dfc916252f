//! Engines backed by docling itself.
//!
//! [`DoclingCli`] shells out to the `docling` converter once per document,
//! asking for a JSON export with pictures embedded as data URIs, then reads
//! that export back through [`schema`](super::schema) and
//! [`reading_order`](super::reading_order). [`JsonExport`] skips the first
//! half and reads an export that already exists.

use super::reading_order;
use super::schema::DoclingDocument;
use super::DocumentEngine;
use crate::config::PipelineOptions;
use crate::error::Pdf2MdError;
use crate::model::DocumentModel;
use crate::pipeline::input::{document_stem, is_json_export};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Picture scale the docling command line renders at.
const CLI_IMAGE_SCALE: f32 = 2.0;

/// Lines of engine stderr kept in [`Pdf2MdError::EngineFailed`].
const STDERR_TAIL_LINES: usize = 40;

/// Runs the `docling` command line.
#[derive(Debug, Clone)]
pub struct DoclingCli {
    program: String,
}

impl DoclingCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for converting `source` into `out_dir`.
    pub fn args(&self, source: &Path, out_dir: &Path, options: &PipelineOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            source.into(),
            "--to".into(),
            "json".into(),
            "--image-export-mode".into(),
            "embedded".into(),
            "--output".into(),
            out_dir.into(),
        ];

        if options.ocr_enabled {
            args.push("--ocr".into());
            args.push("--ocr-engine".into());
            args.push(options.ocr_engine.as_engine_arg().into());
            if !options.ocr_languages.is_empty() {
                args.push("--ocr-lang".into());
                args.push(options.ocr_languages.join(",").into());
            }
        } else {
            args.push("--no-ocr".into());
        }

        args.push("--table-mode".into());
        args.push(options.table_mode.as_engine_arg().into());
        args.push("--num-threads".into());
        args.push(options.accelerator_threads.to_string().into());
        args.push("--device".into());
        args.push(options.accelerator_device.as_engine_arg().into());
        args
    }
}

impl DocumentEngine for DoclingCli {
    fn name(&self) -> &str {
        "docling-cli"
    }

    fn convert(
        &self,
        source: &Path,
        options: &PipelineOptions,
    ) -> Result<DocumentModel, Pdf2MdError> {
        if (options.image_scale - CLI_IMAGE_SCALE).abs() > f32::EPSILON {
            warn!(
                "docling CLI renders pictures at scale {}; requested scale {} is not honoured",
                CLI_IMAGE_SCALE, options.image_scale
            );
        }

        let out_dir = tempfile::TempDir::new()
            .map_err(|e| Pdf2MdError::Internal(format!("tempdir: {e}")))?;
        let args = self.args(source, out_dir.path(), options);
        debug!("Running {} {:?}", self.program, args);

        let start = Instant::now();
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| Pdf2MdError::EngineNotFound {
                program: self.program.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Pdf2MdError::EngineFailed {
                path: source.to_path_buf(),
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        let json_path = out_dir
            .path()
            .join(format!("{}.json", document_stem(source)));
        if !json_path.is_file() {
            return Err(Pdf2MdError::EngineFailed {
                path: source.to_path_buf(),
                status: format!("no JSON export at {}", json_path.display()),
                stderr: stderr_tail(&output.stderr),
            });
        }

        info!(
            "docling converted {} in {}ms",
            source.display(),
            start.elapsed().as_millis()
        );

        let doc = DoclingDocument::from_path(&json_path)?;
        reading_order::flatten(&doc, out_dir.path())
    }
}

/// Reads a JSON document docling exported earlier.
///
/// The source is either the `.json` file itself or a PDF with a
/// `{stem}.json` beside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExport;

impl JsonExport {
    /// Where the export for `source` is expected.
    pub fn export_path(source: &Path) -> PathBuf {
        if is_json_export(source) {
            source.to_path_buf()
        } else {
            source.with_extension("json")
        }
    }
}

impl DocumentEngine for JsonExport {
    fn name(&self) -> &str {
        "docling-json"
    }

    fn convert(
        &self,
        source: &Path,
        _options: &PipelineOptions,
    ) -> Result<DocumentModel, Pdf2MdError> {
        let json_path = Self::export_path(source);
        debug!("Reading docling export {}", json_path.display());
        let doc = DoclingDocument::from_path(&json_path)?;
        let base_dir = json_path.parent().unwrap_or_else(|| Path::new("."));
        reading_order::flatten(&doc, base_dir)
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AcceleratorDevice, OcrEngine, TableMode};
    use crate::model::Element;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn args_without_ocr() {
        let cli = DoclingCli::new("docling");
        let args = strings(&cli.args(
            Path::new("in/a.pdf"),
            Path::new("/tmp/out"),
            &PipelineOptions::default(),
        ));
        assert_eq!(
            args,
            vec![
                "in/a.pdf",
                "--to",
                "json",
                "--image-export-mode",
                "embedded",
                "--output",
                "/tmp/out",
                "--no-ocr",
                "--table-mode",
                "accurate",
                "--num-threads",
                "4",
                "--device",
                "auto"
            ]
        );
    }

    #[test]
    fn args_with_ocr() {
        let options = PipelineOptions {
            ocr_enabled: true,
            ocr_engine: OcrEngine::OcrMac,
            ocr_languages: vec!["ja-JP".into(), "en-US".into()],
            table_mode: TableMode::Fast,
            accelerator_threads: 8,
            accelerator_device: AcceleratorDevice::Mps,
            ..PipelineOptions::default()
        };
        let args = strings(&DoclingCli::new("docling").args(
            Path::new("a.pdf"),
            Path::new("o"),
            &options,
        ));
        let tail = &args[7..];
        assert_eq!(
            tail,
            &[
                "--ocr",
                "--ocr-engine",
                "ocrmac",
                "--ocr-lang",
                "ja-JP,en-US",
                "--table-mode",
                "fast",
                "--num-threads",
                "8",
                "--device",
                "mps"
            ]
        );
    }

    #[test]
    fn missing_program_is_engine_not_found() {
        let cli = DoclingCli::new("/nonexistent/bin/docling-xyz");
        let err = cli
            .convert(Path::new("a.pdf"), &PipelineOptions::default())
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::EngineNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_engine_failed() {
        let cli = DoclingCli::new("false");
        let err = cli
            .convert(Path::new("a.pdf"), &PipelineOptions::default())
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::EngineFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn export_is_read_from_output_dir() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("fake-docling");
        std::fs::write(
            &script,
            r##"#!/bin/sh
src="$1"; out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  shift
done
stem=$(basename "$src" .pdf)
printf '%s' '{"name":"x","body":{"children":[{"$ref":"#/texts/0"}]},"texts":[{"label":"text","text":"hi"}]}' > "$out/$stem.json"
"##,
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cli = DoclingCli::new(script.to_string_lossy());
        let model = cli
            .convert(Path::new("paper.pdf"), &PipelineOptions::default())
            .unwrap();
        assert_eq!(model.len(), 1);
        assert!(matches!(&model.elements()[0].element, Element::Paragraph { text } if text == "hi"));
    }

    #[test]
    fn json_export_reads_sibling_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("doc.json"),
            r##"{"name":"doc","body":{"children":[{"$ref":"#/texts/0"}]},
                 "texts":[{"label":"section_header","text":"Intro","level":1}]}"##,
        )
        .unwrap();

        let from_pdf = JsonExport
            .convert(&tmp.path().join("doc.pdf"), &PipelineOptions::default())
            .unwrap();
        let from_json = JsonExport
            .convert(&tmp.path().join("doc.json"), &PipelineOptions::default())
            .unwrap();
        assert_eq!(from_pdf.len(), 1);
        assert_eq!(from_json.len(), 1);
        assert_eq!(from_json.name, "doc");
    }

    #[test]
    fn json_export_missing_file() {
        let err = JsonExport
            .convert(Path::new("/nope/doc.pdf"), &PipelineOptions::default())
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::InvalidDocumentModel { .. }));
    }

    #[test]
    fn stderr_is_trimmed_to_tail() {
        let long: String = (0..100).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(long.as_bytes());
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 99"));
    }
}
