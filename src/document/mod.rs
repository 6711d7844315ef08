//! Lossless HTML document model
//!
//! Wraps a mutable kuchiki tree together with the DOCTYPE declaration of the
//! source text. The tree serializer only emits the doctype *name*, silently
//! dropping the public/system identifiers, so the triple is lifted out of the
//! tree at parse time and re-rendered verbatim as the first line of every
//! serialization.

use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use std::rc::Rc;

use crate::error::{GraftError, GraftResult};

/// The `name`/`publicId`/`systemId` triple of a DOCTYPE declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctypeInfo {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

impl DoctypeInfo {
    /// Render the declaration, collapsing empty fields:
    /// `<!DOCTYPE name PUBLIC "publicId" "systemId">`, the SYSTEM-only form
    /// when only the system id is present, and `<!DOCTYPE name>` when both
    /// identifiers are empty.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("<!DOCTYPE {}", self.name);
        if !self.public_id.is_empty() {
            out.push_str(&format!(" PUBLIC \"{}\"", self.public_id));
            if !self.system_id.is_empty() {
                out.push_str(&format!(" \"{}\"", self.system_id));
            }
        } else if !self.system_id.is_empty() {
            out.push_str(&format!(" SYSTEM \"{}\"", self.system_id));
        }
        let mut out = out.trim_end().to_string();
        out.push('>');
        out
    }
}

/// A parsed HTML document: mutable tree plus the captured DOCTYPE.
///
/// Owned exclusively by one extraction or reinsertion pass at a time; created
/// from source text and discarded after serialization.
pub struct HtmlDocument {
    tree: NodeRef,
    doctype: Option<DoctypeInfo>,
}

impl HtmlDocument {
    /// Parse raw HTML text. The HTML parser is error-recovering, so this
    /// never fails; malformed markup produces a best-effort tree.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let tree = kuchiki::parse_html().one(html.to_string());
        let mut doctype = None;
        for child in tree.children() {
            if let Some(dt) = child.as_doctype() {
                doctype = Some(DoctypeInfo {
                    name: dt.name.clone(),
                    public_id: dt.public_id.clone(),
                    system_id: dt.system_id.clone(),
                });
                // lift the node out of the tree: the tree serializer would
                // emit a name-only doctype, losing the identifiers
                child.detach();
                break;
            }
        }
        Self { tree, doctype }
    }

    /// The DOCTYPE of the source text, if any.
    #[must_use]
    pub fn doctype(&self) -> Option<&DoctypeInfo> {
        self.doctype.as_ref()
    }

    /// Root of the document tree.
    #[must_use]
    pub fn tree(&self) -> &NodeRef {
        &self.tree
    }

    /// All elements matching a CSS selector, in document order.
    ///
    /// Matches are collected before being returned because callers mutate and
    /// detach nodes while walking them, which would invalidate a live
    /// iterator over the tree.
    pub fn select(&self, selector: &str) -> GraftResult<Vec<NodeDataRef<ElementData>>> {
        Ok(self
            .tree
            .select(selector)
            .map_err(|()| GraftError::InvalidSelector(selector.to_string()))?
            .collect())
    }

    /// Whether the node still hangs off this document's root.
    ///
    /// An element that matched a selector can have been detached in the
    /// meantime when an enclosing element's content was captured and cleared
    /// (an `<svg>` nested inside another `<svg>`, for example).
    #[must_use]
    pub fn is_attached(&self, node: &NodeRef) -> bool {
        node.inclusive_ancestors()
            .last()
            .is_some_and(|root| Rc::ptr_eq(&root.0, &self.tree.0))
    }

    /// Serialize back to text, with the captured DOCTYPE re-rendered as the
    /// first line when the source carried one.
    pub fn serialize(&self) -> GraftResult<String> {
        let mut bytes = Vec::new();
        self.tree.serialize(&mut bytes)?;
        let markup = String::from_utf8(bytes)?;
        Ok(match &self.doctype {
            Some(doctype) => format!("{}\n{}", doctype.render(), markup),
            None => markup,
        })
    }
}

/// Inner markup of an element: the concatenated serialization of its
/// children. Used for content whose embedded subtrees must round-trip
/// (inline SVG); plain-text payloads go through [`raw_text`] instead.
pub fn inner_markup(node: &NodeRef) -> GraftResult<String> {
    let mut bytes = Vec::new();
    for child in node.children() {
        child.serialize(&mut bytes)?;
    }
    Ok(String::from_utf8(bytes)?)
}

/// Text content of a raw-text element (`<script>`, `<style>`).
///
/// For those elements the content model is raw text, so this is exactly the
/// inner markup. Unlike serializing the text nodes in isolation it never
/// entity-escapes `<`, `>` or `&`.
#[must_use]
pub fn raw_text(node: &NodeRef) -> String {
    node.text_contents()
}

/// Detach all children of a node.
pub fn clear_children(node: &NodeRef) {
    // collect first: detaching while iterating breaks the sibling walk
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        child.detach();
    }
}

/// Append a text node carrying raw content. Serialization leaves text inside
/// raw-text elements unescaped, so the bytes survive verbatim.
pub fn set_raw_text(node: &NodeRef, text: &str) {
    if !text.is_empty() {
        node.append(NodeRef::new_text(text));
    }
}

/// Reparse a markup fragment inside the given context tag and move the
/// resulting nodes into `node`. The context tag keeps foreign content (SVG)
/// in its proper namespace during the reparse.
pub fn append_markup(node: &NodeRef, markup: &str, context_tag: &str) -> GraftResult<()> {
    if markup.is_empty() {
        return Ok(());
    }
    let wrapped = kuchiki::parse_html().one(format!("<{context_tag}>{markup}</{context_tag}>"));
    let context = wrapped
        .select_first(context_tag)
        .map_err(|()| GraftError::InvalidSelector(context_tag.to_string()))?;
    let children: Vec<NodeRef> = context.as_node().children().collect();
    for child in children {
        node.append(child);
    }
    Ok(())
}
