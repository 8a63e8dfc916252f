//! Document-conversion engine adapter.
//!
//! ## Why an adapter?
//!
//! Layout analysis, OCR and table-structure recognition are done by docling,
//! which is a Python program. This crate never links it; instead a
//! [`DocumentEngine`] produces the docling document for one source file and
//! the submodules here turn docling's JSON export into the crate's own
//! [`DocumentModel`]. Everything downstream (image filtering, hashing,
//! Markdown) runs on that model and can be tested with an in-memory engine.
//!
//! Two engines ship with the crate:
//!
//! - [`DoclingCli`] runs the `docling` command line per document.
//! - [`JsonExport`] reads a JSON document docling exported earlier.

pub mod docling;
pub mod reading_order;
pub mod schema;
pub mod table;

pub use docling::{DoclingCli, JsonExport};

use crate::config::{ConversionConfig, PipelineOptions};
use crate::error::Pdf2MdError;
use crate::model::DocumentModel;
use crate::pipeline::input::is_json_export;
use std::path::Path;
use std::sync::Arc;

/// Environment variable naming the `docling` executable.
pub const DOCLING_BIN_ENV: &str = "DOCLING_BIN";

/// Program looked up on `PATH` when nothing else is configured.
pub const DEFAULT_DOCLING_PROGRAM: &str = "docling";

/// Converts one source file into a [`DocumentModel`].
///
/// Implementations block; the async entry points call them on a blocking
/// thread. One engine may be shared by many sequential conversions.
pub trait DocumentEngine: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Run the conversion for `source` with the given pipeline options.
    fn convert(
        &self,
        source: &Path,
        options: &PipelineOptions,
    ) -> Result<DocumentModel, Pdf2MdError>;
}

/// Pick the engine for `source`, from most-specific to least-specific.
///
/// 1. **Pre-built engine** (`config.engine`), used as-is.
/// 2. **JSON export**: a `.json` source is read directly, no docling run.
/// 3. **Named program** (`config.engine_program`).
/// 4. **`DOCLING_BIN`** environment variable.
/// 5. `docling` on `PATH`.
pub fn resolve_engine(
    config: &ConversionConfig,
    source: &Path,
) -> Arc<dyn DocumentEngine> {
    if let Some(ref engine) = config.engine {
        return Arc::clone(engine);
    }

    if is_json_export(source) {
        return Arc::new(JsonExport);
    }

    if let Some(ref program) = config.engine_program {
        return Arc::new(DoclingCli::new(program));
    }

    match std::env::var(DOCLING_BIN_ENV) {
        Ok(program) if !program.trim().is_empty() => Arc::new(DoclingCli::new(program)),
        _ => Arc::new(DoclingCli::new(DEFAULT_DOCLING_PROGRAM)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl DocumentEngine for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn convert(&self, _: &Path, _: &PipelineOptions) -> Result<DocumentModel, Pdf2MdError> {
            Ok(DocumentModel::new("fixed"))
        }
    }

    #[test]
    fn explicit_engine_wins() {
        let config = ConversionConfig::builder()
            .engine(Arc::new(Fixed))
            .engine_program("/opt/docling")
            .build()
            .unwrap();
        assert_eq!(resolve_engine(&config, Path::new("a.json")).name(), "fixed");
    }

    #[test]
    fn json_sources_use_the_export_reader() {
        let config = ConversionConfig::builder()
            .engine_program("/opt/docling")
            .build()
            .unwrap();
        assert_eq!(resolve_engine(&config, Path::new("a.json")).name(), "docling-json");
        assert_eq!(resolve_engine(&config, Path::new("a.pdf")).name(), "docling-cli");
    }
}
