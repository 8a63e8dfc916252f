//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The options that only matter to the
//! document-conversion engine live in a separate immutable
//! [`PipelineOptions`] value which is handed to the engine as-is; the rest
//! (image threshold, JPEG quality, figure label) govern the Markdown
//! serialisation done by this crate.
//!
//! Two presets mirror the two ways the tool is normally run:
//! [`ConversionConfig::parse_preset`] for born-digital PDFs (no OCR) and
//! [`ConversionConfig::ocr_preset`] for scanned Japanese/English material.

use crate::engine::DocumentEngine;
use crate::error::Pdf2MdError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Options passed through, unchanged, to the document-conversion engine.
///
/// None of these affect how the Markdown is written; they decide what the
/// engine recognises in the first place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Run OCR on bitmap content. Default: false.
    pub ocr_enabled: bool,

    /// OCR backend used when `ocr_enabled` is set. Default: [`OcrEngine::Auto`].
    pub ocr_engine: OcrEngine,

    /// OCR language codes, in the engine's notation (e.g. `ja-JP`, `en-US`).
    pub ocr_languages: Vec<String>,

    /// Table-structure recognition mode. Default: [`TableMode::Accurate`].
    pub table_mode: TableMode,

    /// Resolution multiplier for extracted picture bitmaps. Default: 3.0.
    ///
    /// Higher scales give sharper figures and push more pictures over the
    /// minimum-size threshold.
    pub image_scale: f32,

    /// Threads the engine may use for model inference. Default: 4.
    pub accelerator_threads: usize,

    /// Inference device. Default: [`AcceleratorDevice::Auto`].
    pub accelerator_device: AcceleratorDevice,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            ocr_enabled: false,
            ocr_engine: OcrEngine::default(),
            ocr_languages: Vec::new(),
            table_mode: TableMode::default(),
            image_scale: 3.0,
            accelerator_threads: 4,
            accelerator_device: AcceleratorDevice::default(),
        }
    }
}

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or one of the presets.
///
/// # Example
/// ```rust
/// use docling_pdf2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .min_image_side(250)
///     .accelerator_threads(8)
///     .build()
///     .unwrap();
/// assert_eq!(config.min_image_side, 250);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Engine pipeline options.
    pub pipeline: PipelineOptions,

    /// Pictures whose shorter side is below this many pixels are dropped. Default: 200.
    pub min_image_side: u32,

    /// JPEG quality (1–100) for extracted pictures. Default: 75.
    ///
    /// The quality is part of the content hash input (it changes the encoded
    /// bytes), so changing it renames every image.
    pub jpeg_quality: u8,

    /// Alt-text prefix for image links; the figure number is appended. Default: `図`.
    pub figure_label: String,

    /// Name of the image directory under the output directory. Default: `images`.
    pub images_subdir: String,

    /// Batch mode: skip sources whose `{stem}.md` already exists. Default: true.
    pub skip_existing: bool,

    /// Pre-constructed engine. Takes precedence over `engine_program`.
    pub engine: Option<Arc<dyn DocumentEngine>>,

    /// Path or name of the `docling` executable.
    /// If None, uses `DOCLING_BIN` or `docling` on `PATH`.
    pub engine_program: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::parse_preset()
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("pipeline", &self.pipeline)
            .field("min_image_side", &self.min_image_side)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("figure_label", &self.figure_label)
            .field("images_subdir", &self.images_subdir)
            .field("skip_existing", &self.skip_existing)
            .field("engine", &self.engine.as_ref().map(|e| e.name().to_string()))
            .field("engine_program", &self.engine_program)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`, starting from the parse preset.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::parse_preset(),
        }
    }

    /// Born-digital PDFs: text layer only, no OCR, 200 px image threshold.
    pub fn parse_preset() -> Self {
        Self {
            pipeline: PipelineOptions::default(),
            min_image_side: 200,
            jpeg_quality: 75,
            figure_label: "図".to_string(),
            images_subdir: "images".to_string(),
            skip_existing: true,
            engine: None,
            engine_program: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }

    /// Scanned documents: native OCR for Japanese and English, 8 threads,
    /// 300 px image threshold.
    pub fn ocr_preset() -> Self {
        let mut config = Self::parse_preset();
        config.pipeline.ocr_enabled = true;
        config.pipeline.ocr_engine = OcrEngine::OcrMac;
        config.pipeline.ocr_languages = vec!["ja-JP".to_string(), "en-US".to_string()];
        config.pipeline.accelerator_threads = 8;
        config.min_image_side = 300;
        config
    }

    /// Turn this config back into a builder, e.g. to override a preset.
    pub fn into_builder(self) -> ConversionConfigBuilder {
        ConversionConfigBuilder { config: self }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn pipeline(mut self, pipeline: PipelineOptions) -> Self {
        self.config.pipeline = pipeline;
        self
    }

    pub fn ocr(mut self, enabled: bool) -> Self {
        self.config.pipeline.ocr_enabled = enabled;
        self
    }

    pub fn ocr_engine(mut self, engine: OcrEngine) -> Self {
        self.config.pipeline.ocr_engine = engine;
        self
    }

    pub fn ocr_languages<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.pipeline.ocr_languages = langs.into_iter().map(Into::into).collect();
        self
    }

    pub fn table_mode(mut self, mode: TableMode) -> Self {
        self.config.pipeline.table_mode = mode;
        self
    }

    pub fn image_scale(mut self, scale: f32) -> Self {
        self.config.pipeline.image_scale = scale;
        self
    }

    pub fn accelerator_threads(mut self, n: usize) -> Self {
        self.config.pipeline.accelerator_threads = n;
        self
    }

    pub fn accelerator_device(mut self, device: AcceleratorDevice) -> Self {
        self.config.pipeline.accelerator_device = device;
        self
    }

    pub fn min_image_side(mut self, px: u32) -> Self {
        self.config.min_image_side = px;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q;
        self
    }

    pub fn figure_label(mut self, label: impl Into<String>) -> Self {
        self.config.figure_label = label.into();
        self
    }

    pub fn images_subdir(mut self, dir: impl Into<String>) -> Self {
        self.config.images_subdir = dir.into();
        self
    }

    pub fn skip_existing(mut self, v: bool) -> Self {
        self.config.skip_existing = v;
        self
    }

    pub fn engine(mut self, engine: Arc<dyn DocumentEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    pub fn engine_program(mut self, program: impl Into<String>) -> Self {
        self.config.engine_program = Some(program.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2MdError> {
        let c = &self.config;
        if c.min_image_side == 0 {
            return Err(Pdf2MdError::InvalidConfig(
                "Minimum image side must be ≥ 1 px".into(),
            ));
        }
        if !(1..=100).contains(&c.jpeg_quality) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if !(c.pipeline.image_scale.is_finite() && c.pipeline.image_scale > 0.0) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "Image scale must be > 0, got {}",
                c.pipeline.image_scale
            )));
        }
        if c.pipeline.accelerator_threads == 0 {
            return Err(Pdf2MdError::InvalidConfig(
                "Accelerator threads must be ≥ 1".into(),
            ));
        }
        if c.images_subdir.is_empty()
            || c.images_subdir.contains(['/', '\\'])
            || c.images_subdir == "."
            || c.images_subdir == ".."
        {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "Images directory must be a single path component, got {:?}",
                c.images_subdir
            )));
        }
        if c.pipeline.ocr_enabled && c.pipeline.ocr_languages.iter().any(|l| l.trim().is_empty()) {
            return Err(Pdf2MdError::InvalidConfig(
                "OCR languages must not contain empty entries".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// OCR backend selection, in the engine's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngine {
    /// Let the engine choose. (default)
    #[default]
    Auto,
    EasyOcr,
    Tesseract,
    TesseractCli,
    /// Apple Vision framework (macOS only).
    OcrMac,
    RapidOcr,
}

impl OcrEngine {
    /// Identifier understood by the `docling` command line.
    pub fn as_engine_arg(&self) -> &'static str {
        match self {
            OcrEngine::Auto => "auto",
            OcrEngine::EasyOcr => "easyocr",
            OcrEngine::Tesseract => "tesseract",
            OcrEngine::TesseractCli => "tesseract_cli",
            OcrEngine::OcrMac => "ocrmac",
            OcrEngine::RapidOcr => "rapidocr",
        }
    }
}

/// Table-structure recognition precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    Fast,
    /// Slower, better cell boundaries. (default)
    #[default]
    Accurate,
}

impl TableMode {
    pub fn as_engine_arg(&self) -> &'static str {
        match self {
            TableMode::Fast => "fast",
            TableMode::Accurate => "accurate",
        }
    }
}

/// Compute device for the engine's models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceleratorDevice {
    #[default]
    Auto,
    Cpu,
    Cuda,
    Mps,
}

impl AcceleratorDevice {
    pub fn as_engine_arg(&self) -> &'static str {
        match self {
            AcceleratorDevice::Auto => "auto",
            AcceleratorDevice::Cpu => "cpu",
            AcceleratorDevice::Cuda => "cuda",
            AcceleratorDevice::Mps => "mps",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_parse_preset() {
        let c = ConversionConfig::default();
        assert!(!c.pipeline.ocr_enabled);
        assert_eq!(c.min_image_side, 200);
        assert_eq!(c.pipeline.accelerator_threads, 4);
        assert_eq!(c.pipeline.table_mode, TableMode::Accurate);
        assert_eq!(c.pipeline.image_scale, 3.0);
        assert_eq!(c.figure_label, "図");
        assert_eq!(c.images_subdir, "images");
        assert_eq!(c.jpeg_quality, 75);
    }

    #[test]
    fn ocr_preset_values() {
        let c = ConversionConfig::ocr_preset();
        assert!(c.pipeline.ocr_enabled);
        assert_eq!(c.pipeline.ocr_engine, OcrEngine::OcrMac);
        assert_eq!(c.pipeline.ocr_languages, vec!["ja-JP", "en-US"]);
        assert_eq!(c.pipeline.accelerator_threads, 8);
        assert_eq!(c.min_image_side, 300);
    }

    #[test]
    fn builder_overrides_preset() {
        let c = ConversionConfig::ocr_preset()
            .into_builder()
            .min_image_side(120)
            .table_mode(TableMode::Fast)
            .build()
            .unwrap();
        assert_eq!(c.min_image_side, 120);
        assert_eq!(c.pipeline.table_mode, TableMode::Fast);
        assert!(c.pipeline.ocr_enabled);
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert!(ConversionConfig::builder().min_image_side(0).build().is_err());
        assert!(ConversionConfig::builder().jpeg_quality(0).build().is_err());
        assert!(ConversionConfig::builder().jpeg_quality(101).build().is_err());
        assert!(ConversionConfig::builder().image_scale(0.0).build().is_err());
        assert!(ConversionConfig::builder().image_scale(f32::NAN).build().is_err());
        assert!(ConversionConfig::builder().accelerator_threads(0).build().is_err());
        assert!(ConversionConfig::builder().images_subdir("a/b").build().is_err());
        assert!(ConversionConfig::builder().images_subdir("").build().is_err());
        assert!(ConversionConfig::builder()
            .ocr(true)
            .ocr_languages(["ja-JP", " "])
            .build()
            .is_err());
    }

    #[test]
    fn engine_args() {
        assert_eq!(OcrEngine::TesseractCli.as_engine_arg(), "tesseract_cli");
        assert_eq!(TableMode::Fast.as_engine_arg(), "fast");
        assert_eq!(AcceleratorDevice::Mps.as_engine_arg(), "mps");
    }

    #[test]
    fn pipeline_options_serialise() {
        let json = serde_json::to_value(PipelineOptions::default()).unwrap();
        assert_eq!(json["table_mode"], "accurate");
        assert_eq!(json["accelerator_device"], "auto");
    }
}
