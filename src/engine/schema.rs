//! Serde model of docling's JSON document export.
//!
//! Only the fields the Markdown writer needs are modelled; everything else
//! in the export is ignored. All item arrays share one flat [`NodeItem`]
//! shape because the kind of an item is decided by the array it lives in
//! (`texts`, `tables`, …) and its `label`, not by a serde tag.

use crate::error::Pdf2MdError;
use serde::Deserialize;
use std::path::Path;

/// Top-level exported document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoclingDocument {
    #[serde(default)]
    pub name: String,
    pub body: NodeItem,
    #[serde(default)]
    pub groups: Vec<NodeItem>,
    #[serde(default)]
    pub texts: Vec<NodeItem>,
    #[serde(default)]
    pub tables: Vec<NodeItem>,
    #[serde(default)]
    pub pictures: Vec<NodeItem>,
    #[serde(default)]
    pub key_value_items: Vec<NodeItem>,
    #[serde(default)]
    pub form_items: Vec<NodeItem>,
}

/// Any node of the document tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeItem {
    #[serde(default)]
    pub self_ref: String,
    #[serde(default)]
    pub children: Vec<ItemRef>,
    #[serde(default)]
    pub label: String,
    /// `body` or `furniture`; absent in older exports (treated as body).
    #[serde(default)]
    pub content_layer: Option<String>,
    #[serde(default)]
    pub prov: Vec<ProvenanceItem>,
    // text items
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub level: Option<usize>,
    #[serde(default)]
    pub enumerated: Option<bool>,
    // table items
    #[serde(default)]
    pub data: Option<TableData>,
    // picture items
    #[serde(default)]
    pub image: Option<ImageRef>,
}

impl NodeItem {
    pub fn is_furniture(&self) -> bool {
        self.content_layer.as_deref() == Some("furniture")
    }

    /// Page of the first provenance entry.
    pub fn page_no(&self) -> Option<usize> {
        self.prov.first().map(|p| p.page_no)
    }
}

/// JSON pointer reference, e.g. `{"$ref": "#/texts/0"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemRef {
    #[serde(rename = "$ref")]
    pub cref: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvenanceItem {
    pub page_no: usize,
}

/// Table structure; `grid` already replicates spanned cells.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableData {
    #[serde(default)]
    pub num_rows: usize,
    #[serde(default)]
    pub num_cols: usize,
    #[serde(default)]
    pub grid: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub text: String,
}

/// Embedded or referenced picture bitmap.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub mimetype: Option<String>,
    pub uri: String,
}

/// Which array a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Body,
    Groups,
    Texts,
    Tables,
    Pictures,
    KeyValueItems,
    FormItems,
}

impl DoclingDocument {
    /// Parse an export from a JSON string.
    pub fn from_json_str(json: &str, origin: &Path) -> Result<Self, Pdf2MdError> {
        serde_json::from_str(json).map_err(|e| Pdf2MdError::InvalidDocumentModel {
            path: origin.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Read and parse an export file.
    pub fn from_path(path: &Path) -> Result<Self, Pdf2MdError> {
        let json = std::fs::read_to_string(path).map_err(|e| Pdf2MdError::InvalidDocumentModel {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_json_str(&json, path)
    }

    /// Follow a `#/<collection>/<index>` pointer.
    pub fn resolve(&self, cref: &str) -> Option<(Collection, &NodeItem)> {
        let path = cref.strip_prefix("#/")?;
        if path == "body" {
            return Some((Collection::Body, &self.body));
        }
        let (name, idx) = path.split_once('/')?;
        let idx: usize = idx.parse().ok()?;
        let (collection, items) = match name {
            "groups" => (Collection::Groups, &self.groups),
            "texts" => (Collection::Texts, &self.texts),
            "tables" => (Collection::Tables, &self.tables),
            "pictures" => (Collection::Pictures, &self.pictures),
            "key_value_items" => (Collection::KeyValueItems, &self.key_value_items),
            "form_items" => (Collection::FormItems, &self.form_items),
            _ => return None,
        };
        items.get(idx).map(|item| (collection, item))
    }
}
