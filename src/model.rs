//! Document model produced by a [`crate::engine::DocumentEngine`].
//!
//! The engine does all of the hard work (layout analysis, OCR, table
//! structure); what reaches this crate is a flat reading-order sequence of
//! [`Element`]s, each paired with its nesting depth. The sequence is built
//! once per document and consumed once by [`crate::pipeline::walk`].

use image::DynamicImage;
use std::fmt;

/// Deepest heading level docling assigns to a section header.
pub const MAX_HEADING_LEVEL: usize = 100;

/// One structural element of a converted document.
#[derive(Debug, Clone)]
pub enum Element {
    /// Section heading; `level` is 1-based, at most [`MAX_HEADING_LEVEL`].
    Heading { level: usize, text: String },
    /// Any plain text block.
    Paragraph { text: String },
    /// One list entry.
    ListItem { text: String, ordered: bool },
    /// Table, already rendered to Markdown by the engine adapter.
    Table { markdown: String },
    /// Figure or chart.
    Picture(Picture),
    /// Structural container; its children follow it in the sequence.
    Group { label: String },
    /// Anything the renderer has no rule for (forms, key-value areas, …).
    Other { label: String },
}

impl Element {
    /// Short name used in logs and stats.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Heading { .. } => "heading",
            Element::Paragraph { .. } => "paragraph",
            Element::ListItem { .. } => "list_item",
            Element::Table { .. } => "table",
            Element::Picture(_) => "picture",
            Element::Group { .. } => "group",
            Element::Other { .. } => "other",
        }
    }
}

/// A picture element.
#[derive(Clone)]
pub struct Picture {
    /// Decoded pixels; `None` when the engine exported no bitmap.
    pub image: Option<DynamicImage>,
    /// 1-based source page, when known.
    pub page_no: Option<usize>,
}

impl Picture {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Some(image),
            page_no: None,
        }
    }

    pub fn with_page(mut self, page_no: usize) -> Self {
        self.page_no = Some(page_no);
        self
    }

    /// `(width, height)` of the bitmap, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|img| (img.width(), img.height()))
    }
}

impl fmt::Debug for Picture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Picture")
            .field("dimensions", &self.dimensions())
            .field("page_no", &self.page_no)
            .finish()
    }
}

/// An element and its nesting depth in the source tree.
///
/// The depth is carried for diagnostics only; rendering ignores it.
#[derive(Debug, Clone)]
pub struct OrderedElement {
    pub element: Element,
    pub depth: usize,
}

/// A converted document: its name and the reading-order sequence.
#[derive(Debug, Clone, Default)]
pub struct DocumentModel {
    /// Document name as reported by the engine (usually the file stem).
    pub name: String,
    elements: Vec<OrderedElement>,
}

impl DocumentModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Append an element at the end of the reading order.
    pub fn push(&mut self, element: Element, depth: usize) {
        self.elements.push(OrderedElement { element, depth });
    }

    /// Builder-style [`push`](Self::push) at depth 1.
    pub fn with(mut self, element: Element) -> Self {
        self.push(element, 1);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Borrow the reading-order sequence.
    pub fn elements(&self) -> &[OrderedElement] {
        &self.elements
    }

    /// Consume the model, yielding the reading-order sequence.
    pub fn into_reading_order(self) -> impl Iterator<Item = OrderedElement> {
        self.elements.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn model_preserves_push_order() {
        let mut doc = DocumentModel::new("doc");
        assert!(doc.is_empty());
        doc.push(
            Element::Heading {
                level: 1,
                text: "A".into(),
            },
            1,
        );
        doc.push(Element::Paragraph { text: "b".into() }, 2);
        let kinds: Vec<_> = doc.elements().iter().map(|e| e.element.kind()).collect();
        assert_eq!(kinds, vec!["heading", "paragraph"]);
        assert_eq!(doc.elements()[1].depth, 2);
        assert_eq!(doc.len(), 2);
        assert!(!doc.is_empty());
    }

    #[test]
    fn picture_dimensions() {
        let pic = Picture::new(DynamicImage::ImageRgb8(RgbImage::new(30, 20))).with_page(4);
        assert_eq!(pic.dimensions(), Some((30, 20)));
        assert_eq!(pic.page_no, Some(4));

        let empty = Picture {
            image: None,
            page_no: None,
        };
        assert_eq!(empty.dimensions(), None);
    }
}
