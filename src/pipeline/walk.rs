//! Single forward pass over a document's reading order.

use crate::error::Pdf2MdError;
use crate::model::OrderedElement;
use crate::pipeline::render::ElementRenderer;
use tracing::debug;

/// Render every element in order, collecting the fragments produced.
///
/// Elements that produce no fragment (groups, skipped pictures, unhandled
/// kinds) simply leave no trace; nothing is reordered or buffered across
/// elements. The first error aborts the walk.
pub fn walk<I>(elements: I, renderer: &mut ElementRenderer) -> Result<Vec<String>, Pdf2MdError>
where
    I: IntoIterator<Item = OrderedElement>,
{
    let mut fragments = Vec::new();
    for (idx, item) in elements.into_iter().enumerate() {
        match renderer.render(&item.element)? {
            Some(fragment) => fragments.push(fragment),
            None => debug!(
                "Element {} ({} at depth {}) produced no fragment",
                idx,
                item.element.kind(),
                item.depth
            ),
        }
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentModel, Element};
    use crate::pipeline::images::ImageStore;

    #[test]
    fn fragments_follow_reading_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut renderer =
            ElementRenderer::new(ImageStore::new(tmp.path().join("images"), 200, 75), "images", "図");

        let doc = DocumentModel::new("d")
            .with(Element::Paragraph { text: "z".into() })
            .with(Element::Group {
                label: "list".into(),
            })
            .with(Element::ListItem {
                text: "y".into(),
                ordered: false,
            })
            .with(Element::Heading {
                level: 2,
                text: "x".into(),
            })
            .with(Element::Table {
                markdown: "|t|".into(),
            });

        let fragments = walk(doc.into_reading_order(), &mut renderer).unwrap();
        assert_eq!(fragments, vec!["z\n", "- y\n", "\n## x\n", "\n|t|\n"]);
    }

    #[test]
    fn empty_document_yields_no_fragments() {
        let tmp = tempfile::tempdir().unwrap();
        let mut renderer =
            ElementRenderer::new(ImageStore::new(tmp.path().join("images"), 200, 75), "images", "図");
        let fragments = walk(DocumentModel::new("e").into_reading_order(), &mut renderer).unwrap();
        assert!(fragments.is_empty());
    }
}
