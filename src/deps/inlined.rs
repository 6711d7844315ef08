//! Inlined-dependency extraction and reinsertion
//!
//! An inlined dependency is content embedded directly in an element's body:
//! inline `<script>`, `<style>`, and `<svg>` subtrees. Extraction captures
//! the embedded content as bytes (raw text for script/style, inner markup
//! for svg so embedded subtrees round-trip), clears the element, and tags it
//! with a marker carrying a fresh `inline://N` id. The captured record also
//! keeps the owning document's directory URL: relative imports inside the
//! content (`@import "./style.css"`, `import "../lib.js"`) can only be
//! resolved against it later.

use kuchiki::NodeRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ExtractConfig;
use crate::document::{
    HtmlDocument, append_markup, clear_children, inner_markup, raw_text, set_raw_text,
};
use crate::error::{GraftError, GraftResult};
use crate::resolve::dir_url_from_file;

use super::{ResourceIds, is_marked, marked_elements};

/// The inlined resource kinds, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InlineKind {
    Script,
    Style,
    Svg,
}

impl InlineKind {
    pub const ALL: [InlineKind; 3] = [InlineKind::Script, InlineKind::Style, InlineKind::Svg];

    /// Whether this kind's payload is markup that must be reparsed on
    /// reinsertion, as opposed to raw text appended verbatim.
    #[must_use]
    pub fn restores_markup(self) -> bool {
        matches!(self, InlineKind::Svg)
    }

    /// Context tag wrapped around a markup payload during the reinsertion
    /// reparse, keeping foreign content in its proper namespace.
    #[must_use]
    pub fn context_tag(self) -> &'static str {
        match self {
            InlineKind::Script => "script",
            InlineKind::Style => "style",
            InlineKind::Svg => "svg",
        }
    }
}

/// One extracted inlined resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinedResource {
    /// Session-unique id, also the value of the element's marker attribute
    pub id: String,
    /// The embedded content as captured from the element's body
    pub content: Vec<u8>,
    /// Directory URL of the owning document, for resolving relative
    /// references inside the content
    pub base: Url,
}

/// Extracted inlined resources, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinedDeps {
    pub scripts: Vec<InlinedResource>,
    pub styles: Vec<InlinedResource>,
    pub svgs: Vec<InlinedResource>,
}

impl InlinedDeps {
    /// Resources of one kind, in extraction order.
    #[must_use]
    pub fn group(&self, kind: InlineKind) -> &[InlinedResource] {
        match kind {
            InlineKind::Script => &self.scripts,
            InlineKind::Style => &self.styles,
            InlineKind::Svg => &self.svgs,
        }
    }

    fn group_mut(&mut self, kind: InlineKind) -> &mut Vec<InlinedResource> {
        match kind {
            InlineKind::Script => &mut self.scripts,
            InlineKind::Style => &mut self.styles,
            InlineKind::Svg => &mut self.svgs,
        }
    }

    /// Total count across kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        InlineKind::ALL.into_iter().map(|k| self.group(k).len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten in the deterministic kind order (script, style, svg;
    /// extraction order within a kind). Transformed contents handed to
    /// [`reinsert`] pair positionally with this ordering.
    pub fn iter(&self) -> impl Iterator<Item = (InlineKind, &InlinedResource)> + '_ {
        InlineKind::ALL
            .into_iter()
            .flat_map(|kind| self.group(kind).iter().map(move |res| (kind, res)))
    }

    /// Captured contents in flattening order; the identity outputs for a
    /// build step that transforms nothing.
    #[must_use]
    pub fn captured_contents(&self) -> Vec<Vec<u8>> {
        self.iter().map(|(_, res)| res.content.clone()).collect()
    }
}

/// Whether any descendant already carries a marker attribute.
///
/// Capturing and clearing such a subtree would take the marked element out of
/// the document and orphan its table entry, so the enclosing element must be
/// left alone instead.
fn subtree_has_marker(node: &NodeRef, config: &ExtractConfig) -> GraftResult<bool> {
    for marker in [&config.link.marker_attr, &config.inline.marker_attr] {
        let lookup = format!("[{marker}]");
        let found = node
            .select(&lookup)
            .map_err(|()| GraftError::InvalidSelector(lookup))?
            .next()
            .is_some();
        if found {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Scan a parsed document and strip its inlined dependencies.
///
/// Elements already carrying a marker are skipped, including elements the
/// linked pass stripped, whose `src` removal would otherwise make them match
/// `script:not([src])`. An element whose subtree contains a marked element
/// (a stylesheet or image nested inside an `<svg>`, say) is also left alone:
/// extracting it would orphan the earlier extraction. Empty bodies are
/// captured as empty content, which is normal, not an error.
pub fn extract(
    doc: &HtmlDocument,
    base: &Url,
    ids: &mut ResourceIds,
    config: &ExtractConfig,
) -> GraftResult<InlinedDeps> {
    let mut deps = InlinedDeps::default();
    for kind in InlineKind::ALL {
        let rule = config.inline.rule(kind);
        for elem in doc.select(&rule.selector)? {
            let node = elem.as_node();
            // an earlier match may have captured and cleared an enclosing
            // element, taking this one out of the document with it
            if !doc.is_attached(node) {
                log::debug!("skipping detached {kind:?} match inside captured content");
                continue;
            }
            {
                let attrs = elem.attributes.borrow();
                if is_marked(&attrs, config) {
                    continue;
                }
            }
            if subtree_has_marker(node, config)? {
                log::debug!("skipping {kind:?} match with already-extracted descendants");
                continue;
            }
            let content = if kind.restores_markup() {
                inner_markup(node)?.into_bytes()
            } else {
                raw_text(node).into_bytes()
            };
            let id = ids.next_inline();
            clear_children(node);
            elem.attributes
                .borrow_mut()
                .insert(config.inline.marker_attr.as_str(), id.clone());
            log::debug!("extracted {kind:?} content {id} ({} bytes)", content.len());
            deps.group_mut(kind).push(InlinedResource {
                id,
                content,
                base: base.clone(),
            });
        }
    }
    log::debug!("inline extraction found {} resources", deps.len());
    Ok(deps)
}

/// Restore inlined content into a parsed stripped document.
///
/// `outputs` are the build step's transformed contents, paired positionally
/// with [`InlinedDeps::iter`]; the stored representation is textual, so each
/// output must decode as UTF-8. Every table entry must find its marker and
/// every marker must be consumed.
pub fn reinsert(
    doc: &HtmlDocument,
    deps: &InlinedDeps,
    outputs: &[Vec<u8>],
    config: &ExtractConfig,
) -> GraftResult<()> {
    if outputs.len() != deps.len() {
        return Err(GraftError::CountMismatch {
            expected: deps.len(),
            provided: outputs.len(),
        });
    }
    let mut by_id = marked_elements(doc, &config.inline.marker_attr)?;
    for ((kind, res), output) in deps.iter().zip(outputs) {
        let elem = by_id
            .remove(&res.id)
            .ok_or_else(|| GraftError::MissingPlaceholder { id: res.id.clone() })?;
        let text = String::from_utf8(output.clone())
            .map_err(|_| GraftError::ContentEncoding { id: res.id.clone() })?;
        let node = elem.as_node();
        clear_children(node);
        if kind.restores_markup() {
            append_markup(node, &text, kind.context_tag())?;
        } else {
            set_raw_text(node, &text);
        }
        elem.attributes
            .borrow_mut()
            .remove(config.inline.marker_attr.as_str());
        log::debug!("restored {kind:?} content {} ({} bytes)", res.id, output.len());
    }
    if let Some(id) = by_id.into_keys().next() {
        return Err(GraftError::UnmatchedPlaceholder { id });
    }
    Ok(())
}

/// Text-level extraction: parse, strip, and serialize in one call.
pub fn extract_html(
    html: &str,
    path: &str,
    config: &ExtractConfig,
) -> GraftResult<(String, InlinedDeps)> {
    let base = dir_url_from_file(path)?;
    let doc = HtmlDocument::parse(html);
    let mut ids = ResourceIds::new();
    let deps = extract(&doc, &base, &mut ids, config)?;
    Ok((doc.serialize()?, deps))
}

/// Text-level reinsertion: parse the stripped text, restore, and serialize.
pub fn reinsert_html(
    html: &str,
    deps: &InlinedDeps,
    outputs: &[Vec<u8>],
    config: &ExtractConfig,
) -> GraftResult<String> {
    let doc = HtmlDocument::parse(html);
    reinsert(&doc, deps, outputs, config)?;
    doc.serialize()
}
