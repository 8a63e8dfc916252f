//! Flatten a docling document tree into the reading-order sequence.
//!
//! ## Rules
//!
//! - Depth-first pre-order from `body`; body's direct children are depth 1.
//! - Groups are yielded as [`Element::Group`] and their children follow at
//!   depth + 1. Text, table and form items may also carry children (nested
//!   lists, captions) and are descended into the same way.
//! - Pictures are leaves: anything docling parked under a picture (OCR'd
//!   text inside a chart, for instance) is not part of the body text.
//! - Page headers, footers and other `furniture` items are dropped with
//!   their subtrees.
//! - Dangling or repeated references are skipped.

use crate::engine::schema::{Collection, DoclingDocument, ImageRef, NodeItem};
use crate::engine::table;
use crate::error::Pdf2MdError;
use crate::model::{DocumentModel, Element, Picture, MAX_HEADING_LEVEL};
use base64::Engine as _;
use image::DynamicImage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `data:<mime>[;params];base64,<payload>`
static DATA_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^data:(?P<mime>[^;,]*)(?:;[^;,]*)*;base64,(?P<payload>.*)$").unwrap());

/// Build the reading-order model of `doc`.
///
/// `base_dir` is where non-inline picture URIs are resolved from; docling
/// writes them relative to the JSON file.
pub fn flatten(doc: &DoclingDocument, base_dir: &Path) -> Result<DocumentModel, Pdf2MdError> {
    let mut walker = TreeWalker {
        doc,
        base_dir,
        model: DocumentModel::new(doc.name.clone()),
        visited: HashSet::new(),
    };
    for child in &doc.body.children {
        walker.visit(&child.cref, 1)?;
    }
    debug!(
        "Flattened '{}' into {} elements",
        doc.name,
        walker.model.len()
    );
    Ok(walker.model)
}

struct TreeWalker<'a> {
    doc: &'a DoclingDocument,
    base_dir: &'a Path,
    model: DocumentModel,
    visited: HashSet<&'a str>,
}

impl<'a> TreeWalker<'a> {
    fn visit(&mut self, cref: &'a str, depth: usize) -> Result<(), Pdf2MdError> {
        let Some((collection, item)) = self.doc.resolve(cref) else {
            debug!("Skipping dangling reference {cref}");
            return Ok(());
        };
        if !self.visited.insert(cref) {
            debug!("Skipping repeated reference {cref}");
            return Ok(());
        }
        if item.is_furniture() {
            return Ok(());
        }

        let element = match collection {
            // `#/body` reachable from inside the tree is a cycle.
            Collection::Body => return Ok(()),
            Collection::Groups => Element::Group {
                label: item.label.clone(),
            },
            Collection::Texts => text_element(item),
            Collection::Tables => Element::Table {
                markdown: item.data.as_ref().map(table::to_markdown).unwrap_or_default(),
            },
            Collection::Pictures => {
                let picture = self.picture(cref, item)?;
                self.model.push(Element::Picture(picture), depth);
                return Ok(());
            }
            Collection::KeyValueItems | Collection::FormItems => Element::Other {
                label: item.label.clone(),
            },
        };
        self.model.push(element, depth);

        for child in &item.children {
            self.visit(&child.cref, depth + 1)?;
        }
        Ok(())
    }

    fn picture(&self, cref: &str, item: &NodeItem) -> Result<Picture, Pdf2MdError> {
        let image = match &item.image {
            Some(image_ref) => Some(decode_image(cref, image_ref, self.base_dir)?),
            None => {
                debug!("Picture {cref} has no exported bitmap");
                None
            }
        };
        Ok(Picture {
            image,
            page_no: item.page_no(),
        })
    }
}

fn text_element(item: &NodeItem) -> Element {
    let text = item.text.clone().unwrap_or_default();
    match item.label.as_str() {
        "section_header" => Element::Heading {
            level: item.level.unwrap_or(1).clamp(1, MAX_HEADING_LEVEL),
            text,
        },
        "list_item" => Element::ListItem {
            text,
            ordered: item.enumerated.unwrap_or(false),
        },
        _ => Element::Paragraph { text },
    }
}

/// Decode an inline `data:` URI or load a file the URI points at.
fn decode_image(cref: &str, image_ref: &ImageRef, base_dir: &Path) -> Result<DynamicImage, Pdf2MdError> {
    let decode_err = |detail: String| Pdf2MdError::ImageDecode {
        item: cref.to_string(),
        detail,
    };

    let bytes = if let Some(caps) = DATA_URI.captures(&image_ref.uri) {
        base64::engine::general_purpose::STANDARD
            .decode(caps["payload"].trim())
            .map_err(|e| decode_err(format!("bad base64 payload: {e}")))?
    } else if image_ref.uri.starts_with("data:") {
        return Err(decode_err("unsupported data URI (expected base64)".into()));
    } else {
        let path = image_path(&image_ref.uri, base_dir);
        std::fs::read(&path).map_err(|e| decode_err(format!("{}: {e}", path.display())))?
    };

    image::load_from_memory(&bytes).map_err(|e| decode_err(e.to_string()))
}

fn image_path(uri: &str, base_dir: &Path) -> PathBuf {
    let raw = Path::new(uri.strip_prefix("file://").unwrap_or(uri));
    if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        base_dir.join(raw)
    }
}
