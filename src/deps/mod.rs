//! Dependency extraction and reinsertion
//!
//! Two passes over one document: [`linked`] handles resources referenced by a
//! URL-bearing attribute, [`inlined`] handles content embedded in an
//! element's body. Both tag stripped elements in place with a marker
//! attribute carrying a session-unique resource id, and both restore by
//! marker lookup over a reparse of the stripped text.

pub mod inlined;
pub mod linked;

use std::collections::BTreeMap;

use kuchiki::{Attributes, ElementData, NodeDataRef};

use crate::config::ExtractConfig;
use crate::document::HtmlDocument;
use crate::error::GraftResult;

/// URI scheme of linked-resource ids (`link://0`, `link://1`, …).
pub const LINK_ID_SCHEME: &str = "link://";

/// URI scheme of inlined-resource ids (`inline://0`, `inline://1`, …).
pub const INLINE_ID_SCHEME: &str = "inline://";

/// Per-session resource id allocator.
///
/// One instance is threaded through every extraction pass over a document, so
/// ids are unique across kinds and across the linked/inlined split, and
/// concurrent sessions over different documents never interfere. Ids must
/// never be compared across documents.
#[derive(Debug, Default)]
pub struct ResourceIds {
    next: u64,
}

impl ResourceIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh `link://N` id.
    pub fn next_link(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        format!("{LINK_ID_SCHEME}{id}")
    }

    /// Allocate a fresh `inline://N` id.
    pub fn next_inline(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        format!("{INLINE_ID_SCHEME}{id}")
    }
}

/// Whether an element already carries either marker attribute.
///
/// Extraction skips marked elements: a second scan over an already-stripped
/// document must not re-extract, and an element stripped by the linked pass
/// (its `src` removed) must not be picked up as inline content.
pub(crate) fn is_marked(attrs: &Attributes, config: &ExtractConfig) -> bool {
    attrs.contains(config.link.marker_attr.as_str())
        || attrs.contains(config.inline.marker_attr.as_str())
}

/// Map of marker-attribute value → element, for reinsertion lookups.
///
/// A BTreeMap keeps iteration deterministic, so leftover-marker errors always
/// name the same id for the same document.
pub(crate) fn marked_elements(
    doc: &HtmlDocument,
    marker_attr: &str,
) -> GraftResult<BTreeMap<String, NodeDataRef<ElementData>>> {
    let mut by_id = BTreeMap::new();
    for elem in doc.select(&format!("[{marker_attr}]"))? {
        let id = {
            let attrs = elem.attributes.borrow();
            attrs.get(marker_attr).map(str::to_owned)
        };
        if let Some(id) = id {
            by_id.insert(id, elem);
        }
    }
    Ok(by_id)
}
