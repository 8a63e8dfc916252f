//! Element → Markdown fragment.
//!
//! Each fragment carries its own newline conventions so that fragments can
//! be concatenated with no separator:
//!
//! | Element   | Fragment                                  |
//! |-----------|-------------------------------------------|
//! | Heading   | `\n` + `#`×level + ` ` + text + `\n`      |
//! | Paragraph | text + `\n`                               |
//! | ListItem  | `- ` or `1. ` + text + `\n`               |
//! | Table     | `\n` + table markdown + `\n`              |
//! | Picture   | `\n![{label}{n}](images/{file})\n`        |
//! | Group     | nothing                                   |
//!
//! Text is passed through verbatim; Markdown metacharacters are not escaped.
//! Ordered items always use the literal `1.` marker and rely on the Markdown
//! renderer's auto-numbering.

use crate::error::Pdf2MdError;
use crate::model::{Element, Picture, MAX_HEADING_LEVEL};
use crate::pipeline::images::{ImageStore, StoreOutcome};
use crate::progress::ProgressCallback;
use tracing::{debug, info};

/// Counters collected while rendering one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderCounters {
    pub images: usize,
    pub skipped_images: usize,
    pub duplicate_images: usize,
    pub tables: usize,
    pub headings: usize,
    pub unhandled: usize,
}

/// Stateful renderer for one document conversion.
///
/// Owns the image counter (starts at 0, incremented before use so the first
/// accepted picture is figure 1) and the [`ImageStore`].
pub struct ElementRenderer {
    store: ImageStore,
    images_subdir: String,
    figure_label: String,
    counters: RenderCounters,
    progress: Option<ProgressCallback>,
}

impl ElementRenderer {
    pub fn new(
        store: ImageStore,
        images_subdir: impl Into<String>,
        figure_label: impl Into<String>,
    ) -> Self {
        Self {
            store,
            images_subdir: images_subdir.into(),
            figure_label: figure_label.into(),
            counters: RenderCounters::default(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    pub fn counters(&self) -> RenderCounters {
        self.counters
    }

    /// Render one element; `Ok(None)` means it contributes nothing.
    pub fn render(&mut self, element: &Element) -> Result<Option<String>, Pdf2MdError> {
        match element {
            Element::Heading { level, text } => {
                self.counters.headings += 1;
                Ok(Some(heading(*level, text)))
            }
            Element::Paragraph { text } => Ok(Some(format!("{text}\n"))),
            Element::ListItem { text, ordered } => Ok(Some(list_item(text, *ordered))),
            Element::Table { markdown } => {
                self.counters.tables += 1;
                info!("Rendered table {}", self.counters.tables);
                if let Some(ref cb) = self.progress {
                    cb.on_table_rendered(self.counters.tables);
                }
                Ok(Some(format!("\n{markdown}\n")))
            }
            Element::Picture(picture) => self.render_picture(picture),
            Element::Group { .. } => Ok(None),
            Element::Other { label } => {
                self.counters.unhandled += 1;
                debug!("No rendering rule for element '{}'; skipped", label);
                Ok(None)
            }
        }
    }

    fn render_picture(&mut self, picture: &Picture) -> Result<Option<String>, Pdf2MdError> {
        let Some(ref img) = picture.image else {
            debug!("Picture without bitmap (page {:?}); skipped", picture.page_no);
            return Ok(None);
        };

        match self.store.store(img)? {
            StoreOutcome::Skipped { width, height } => {
                self.counters.skipped_images += 1;
                if let Some(ref cb) = self.progress {
                    cb.on_image_skipped(width, height);
                }
                Ok(None)
            }
            StoreOutcome::Stored(stored) => {
                self.counters.images += 1;
                if stored.duplicate {
                    self.counters.duplicate_images += 1;
                }
                let n = self.counters.images;
                info!(
                    "Saved picture {} → {} (page {})",
                    n,
                    stored.filename,
                    picture
                        .page_no
                        .map_or_else(|| "unknown".to_string(), |p| p.to_string())
                );
                if let Some(ref cb) = self.progress {
                    cb.on_image_saved(n, &stored.filename);
                }
                Ok(Some(format!(
                    "\n![{}{}]({}/{})\n",
                    self.figure_label, n, self.images_subdir, stored.filename
                )))
            }
        }
    }
}

fn heading(level: usize, text: &str) -> String {
    let level = level.clamp(1, MAX_HEADING_LEVEL);
    format!("\n{} {}\n", "#".repeat(level), text)
}

fn list_item(text: &str, ordered: bool) -> String {
    let marker = if ordered { "1." } else { "-" };
    format!("{marker} {text}\n")
}
