//! CLI binary for docling-pdf2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use docling_pdf2md::{
    convert, convert_dir, AcceleratorDevice, ConversionConfig, ConversionProgressCallback,
    ConversionStats, DocumentOutcome, JsonExport, OcrEngine, Pdf2MdError, ProgressCallback,
    TableMode,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while docling runs, plus one log
/// line per saved figure and a summary per document.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, source: &Path) {
        self.bar.reset_elapsed();
        self.bar.set_prefix("Converting");
        self.bar.set_message(file_name(source));
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {}…", source.display()))
        ));
    }

    fn on_table_rendered(&self, index: usize) {
        self.bar.println(format!("  {} Table {:>3}", green("✓"), index));
    }

    fn on_image_saved(&self, counter: usize, filename: &str) {
        self.bar.println(format!(
            "  {} Figure {:>3}  {}",
            green("✓"),
            counter,
            dim(filename)
        ));
    }

    fn on_image_skipped(&self, width: u32, height: u32) {
        self.bar
            .println(format!("  {} {}", dim("·"), dim(&format!("skipped {width}x{height} picture"))));
    }

    fn on_conversion_complete(&self, source: &Path, stats: &ConversionStats) {
        self.bar.println(format!(
            "{} {}  {} images, {} tables  {}",
            green("✔"),
            bold(&file_name(source)),
            stats.images,
            stats.tables,
            dim(&format!("{:.1}s", stats.total_duration_ms as f64 / 1000.0)),
        ));
    }

    fn on_conversion_error(&self, source: &Path, error: &Pdf2MdError) {
        let msg = error.to_string();
        let first = msg.lines().next().unwrap_or_default();
        self.bar.println(format!(
            "{} {}  {}",
            red("✘"),
            bold(&file_name(source)),
            red(first)
        ));
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one PDF; Markdown and images/ land next to it
  pdf2md paper.pdf

  # Convert into another directory
  pdf2md paper.pdf -o out/

  # Scanned Japanese material (OCR preset, 300 px picture threshold)
  pdf2md --preset ocr scan.pdf -o out/

  # Convert every PDF in a folder, skipping those already converted
  pdf2md pdfs/ -o markdown/

  # Reconvert everything
  pdf2md --force pdfs/ -o markdown/

  # Re-render from a JSON document docling exported earlier
  pdf2md paper.json -o out/

  # Machine-readable stats
  pdf2md --json paper.pdf > stats.json

OUTPUT:
  {output}/{stem}.md            Markdown
  {output}/images/{hash}.jpg    figures, hash = sha256(jpeg)[..16]

ENVIRONMENT VARIABLES:
  DOCLING_BIN     Path to the docling executable (default: docling on PATH)
  RUST_LOG        Override log filter (e.g. docling_pdf2md=debug)

SETUP:
  1. Install docling:  pip install docling
  2. Convert:          pdf2md document.pdf
"#;

/// Convert PDF files to Markdown with docling.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md",
    version,
    about = "Convert PDF files to Markdown with docling",
    long_about = "Convert PDF documents (local files, URLs, or whole folders) to Markdown using \
docling for layout analysis, OCR and table recognition. Figures are saved as JPEG files named \
by the SHA-256 of their content.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file, docling JSON export, HTTP/HTTPS URL, or directory of PDFs.
    input: String,

    /// Output directory. Default: the input's directory.
    #[arg(short, long, env = "PDF2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Starting configuration: parse (born-digital) or ocr (scanned).
    #[arg(long, env = "PDF2MD_PRESET", value_enum, default_value = "parse")]
    preset: PresetArg,

    /// Enable OCR.
    #[arg(long, env = "PDF2MD_OCR", overrides_with = "no_ocr")]
    ocr: bool,

    /// Disable OCR.
    #[arg(long, overrides_with = "ocr")]
    no_ocr: bool,

    /// OCR backend.
    #[arg(long, env = "PDF2MD_OCR_ENGINE", value_enum)]
    ocr_engine: Option<OcrEngineArg>,

    /// OCR languages, comma-separated (e.g. ja-JP,en-US).
    #[arg(long, env = "PDF2MD_OCR_LANG", value_delimiter = ',')]
    ocr_lang: Option<Vec<String>>,

    /// Table-structure mode.
    #[arg(long, env = "PDF2MD_TABLE_MODE", value_enum)]
    table_mode: Option<TableModeArg>,

    /// Picture resolution multiplier.
    #[arg(long, env = "PDF2MD_IMAGE_SCALE")]
    image_scale: Option<f32>,

    /// Engine inference threads.
    #[arg(long, env = "PDF2MD_THREADS")]
    threads: Option<usize>,

    /// Inference device.
    #[arg(long, env = "PDF2MD_DEVICE", value_enum)]
    device: Option<DeviceArg>,

    /// Drop pictures whose shorter side is below this many pixels.
    #[arg(long, env = "PDF2MD_MIN_IMAGE_SIDE")]
    min_image_side: Option<u32>,

    /// JPEG quality for saved figures (1–100).
    #[arg(long, env = "PDF2MD_JPEG_QUALITY",
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: Option<u8>,

    /// Alt-text prefix for figure links.
    #[arg(long, env = "PDF2MD_FIGURE_LABEL")]
    figure_label: Option<String>,

    /// docling executable.
    #[arg(long, env = "DOCLING_BIN")]
    engine: Option<String>,

    /// Read `{stem}.json` exported by docling instead of running it.
    #[arg(long, env = "PDF2MD_FROM_JSON")]
    from_json: bool,

    /// Batch: convert documents even if their Markdown already exists.
    #[arg(long, env = "PDF2MD_FORCE")]
    force: bool,

    /// Print stats (or batch outcomes) as JSON on stdout.
    #[arg(long, env = "PDF2MD_JSON")]
    json: bool,

    /// Disable progress output.
    #[arg(long, env = "PDF2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2MD_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2MD_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PresetArg {
    Parse,
    Ocr,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OcrEngineArg {
    Auto,
    Easyocr,
    Tesseract,
    TesseractCli,
    Ocrmac,
    Rapidocr,
}

impl From<OcrEngineArg> for OcrEngine {
    fn from(v: OcrEngineArg) -> Self {
        match v {
            OcrEngineArg::Auto => OcrEngine::Auto,
            OcrEngineArg::Easyocr => OcrEngine::EasyOcr,
            OcrEngineArg::Tesseract => OcrEngine::Tesseract,
            OcrEngineArg::TesseractCli => OcrEngine::TesseractCli,
            OcrEngineArg::Ocrmac => OcrEngine::OcrMac,
            OcrEngineArg::Rapidocr => OcrEngine::RapidOcr,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TableModeArg {
    Fast,
    Accurate,
}

impl From<TableModeArg> for TableMode {
    fn from(v: TableModeArg) -> Self {
        match v {
            TableModeArg::Fast => TableMode::Fast,
            TableModeArg::Accurate => TableMode::Accurate,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum DeviceArg {
    Auto,
    Cpu,
    Cuda,
    Mps,
}

impl From<DeviceArg> for AcceleratorDevice {
    fn from(v: DeviceArg) -> Self {
        match v {
            DeviceArg::Auto => AcceleratorDevice::Auto,
            DeviceArg::Cpu => AcceleratorDevice::Cpu,
            DeviceArg::Cuda => AcceleratorDevice::Cuda,
            DeviceArg::Mps => AcceleratorDevice::Mps,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress output is active;
    // the callback already reports everything that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(
        &cli,
        progress
            .clone()
            .map(|cb| cb as Arc<dyn ConversionProgressCallback>),
    )?;

    let input_path = Path::new(&cli.input);
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(&cli.input));

    // ── Batch mode ───────────────────────────────────────────────────────
    if input_path.is_dir() {
        let report = convert_dir(input_path, &output_dir, &config)
            .await
            .with_context(|| format!("Failed to read directory {}", input_path.display()))?;
        if let Some(ref cb) = progress {
            cb.finish();
        }

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else if !cli.quiet {
            for outcome in &report.outcomes {
                if let DocumentOutcome::Failure {
                    source,
                    message,
                    cause,
                    ..
                } = outcome
                {
                    eprintln!("{} {}: {}", red("✘"), source.display(), message);
                    if !cause.is_empty() {
                        eprintln!("{}", dim(cause));
                    }
                }
            }
            eprintln!(
                "{}  {} converted, {} skipped, {} failed  →  {}",
                if report.failed() == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                report.converted(),
                report.skipped.len(),
                report.failed(),
                bold(&output_dir.display().to_string()),
            );
        }

        if report.failed() > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    // ── Single document ──────────────────────────────────────────────────
    let result = convert(&cli.input, &output_dir, &config).await;
    if let Some(ref cb) = progress {
        if let Err(ref e) = result {
            cb.on_conversion_error(input_path, e);
        }
        cb.finish();
    }

    // anyhow prints the full cause chain on exit.
    let output = result.context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} images ({} skipped)  {} tables  {:.2}s  →  {}",
            green("✔"),
            stats.images,
            stats.skipped_images,
            stats.tables,
            stats.total_duration_ms as f64 / 1000.0,
            bold(&output.markdown_path.display().to_string()),
        );
    }

    Ok(())
}

/// Markdown goes beside the source unless `-o` says otherwise.
fn default_output_dir(input: &str) -> PathBuf {
    let path = Path::new(input);
    if input.starts_with("http://") || input.starts_with("https://") {
        return PathBuf::from(".");
    }
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let preset = match cli.preset {
        PresetArg::Parse => ConversionConfig::parse_preset(),
        PresetArg::Ocr => ConversionConfig::ocr_preset(),
    };
    let mut builder = preset
        .into_builder()
        .skip_existing(!cli.force)
        .download_timeout_secs(cli.download_timeout);

    if cli.ocr {
        builder = builder.ocr(true);
    } else if cli.no_ocr {
        builder = builder.ocr(false);
    }
    if let Some(engine) = cli.ocr_engine {
        builder = builder.ocr_engine(engine.into());
    }
    if let Some(ref langs) = cli.ocr_lang {
        builder = builder.ocr_languages(langs.iter().map(|l| l.trim().to_string()));
    }
    if let Some(mode) = cli.table_mode {
        builder = builder.table_mode(mode.into());
    }
    if let Some(scale) = cli.image_scale {
        builder = builder.image_scale(scale);
    }
    if let Some(n) = cli.threads {
        builder = builder.accelerator_threads(n);
    }
    if let Some(device) = cli.device {
        builder = builder.accelerator_device(device.into());
    }
    if let Some(px) = cli.min_image_side {
        builder = builder.min_image_side(px);
    }
    if let Some(q) = cli.jpeg_quality {
        builder = builder.jpeg_quality(q);
    }
    if let Some(ref label) = cli.figure_label {
        builder = builder.figure_label(label.clone());
    }
    if cli.from_json {
        builder = builder.engine(Arc::new(JsonExport));
    } else if let Some(ref program) = cli.engine {
        builder = builder.engine_program(program.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
