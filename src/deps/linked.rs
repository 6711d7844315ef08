//! Linked-dependency extraction and reinsertion
//!
//! A linked dependency is a resource referenced by URL or path from an
//! attribute: `<script src>`, `<link rel="stylesheet" href>`, `<img src>`
//! (including `data:` base64 images), `<link rel~="icon" href>`. Extraction
//! resolves the reference against the document base, removes the attribute,
//! and tags the element with a marker carrying a fresh `link://N` id; the
//! element keeps its identity and every other attribute. Reinsertion looks
//! the marker up again in the reparsed stripped text and restores the
//! kind-appropriate attribute with the build step's output path.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ExtractConfig;
use crate::document::HtmlDocument;
use crate::error::{GraftError, GraftResult};
use crate::resolve::{dir_url_from_file, resolve_as_url};

use super::{ResourceIds, is_marked, marked_elements};

/// The linked resource kinds, in processing order.
///
/// The order is fixed so id allocation is reproducible for identical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    Script,
    Stylesheet,
    Image,
    Icon,
}

impl LinkKind {
    pub const ALL: [LinkKind; 4] = [
        LinkKind::Script,
        LinkKind::Stylesheet,
        LinkKind::Image,
        LinkKind::Icon,
    ];
}

/// One extracted linked dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedDependency {
    /// Session-unique id, also the value of the element's marker attribute
    pub id: String,
    /// Fully resolved absolute URL of the referenced resource
    pub url: Url,
}

/// Extracted linked dependencies, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedDeps {
    pub scripts: Vec<LinkedDependency>,
    pub styles: Vec<LinkedDependency>,
    pub images: Vec<LinkedDependency>,
    pub icons: Vec<LinkedDependency>,
}

impl LinkedDeps {
    /// Dependencies of one kind, in extraction order.
    #[must_use]
    pub fn group(&self, kind: LinkKind) -> &[LinkedDependency] {
        match kind {
            LinkKind::Script => &self.scripts,
            LinkKind::Stylesheet => &self.styles,
            LinkKind::Image => &self.images,
            LinkKind::Icon => &self.icons,
        }
    }

    fn group_mut(&mut self, kind: LinkKind) -> &mut Vec<LinkedDependency> {
        match kind {
            LinkKind::Script => &mut self.scripts,
            LinkKind::Stylesheet => &mut self.styles,
            LinkKind::Image => &mut self.images,
            LinkKind::Icon => &mut self.icons,
        }
    }

    /// Total count across kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        LinkKind::ALL.into_iter().map(|k| self.group(k).len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten in the deterministic kind order (script, style, image, icon;
    /// extraction order within a kind). Transformed output paths handed to
    /// [`reinsert`] pair positionally with this ordering.
    pub fn iter(&self) -> impl Iterator<Item = (LinkKind, &LinkedDependency)> + '_ {
        LinkKind::ALL
            .into_iter()
            .flat_map(|kind| self.group(kind).iter().map(move |dep| (kind, dep)))
    }

    /// Resolved URLs in flattening order; the identity outputs for a build
    /// step that rewrites nothing.
    #[must_use]
    pub fn resolved_urls(&self) -> Vec<String> {
        self.iter().map(|(_, dep)| dep.url.to_string()).collect()
    }
}

/// Scan a parsed document and strip its linked dependencies.
///
/// Elements already carrying a marker are skipped, so a re-scan allocates
/// nothing new. A matching element without the configured resource attribute
/// is left alone.
pub fn extract(
    doc: &HtmlDocument,
    base: &Url,
    ids: &mut ResourceIds,
    config: &ExtractConfig,
) -> GraftResult<LinkedDeps> {
    let mut deps = LinkedDeps::default();
    for kind in LinkKind::ALL {
        let rule = config.link.rule(kind);
        for elem in doc.select(&rule.selector)? {
            // an element can leave the document between matching and
            // processing when another pass captures an enclosing subtree
            if !doc.is_attached(elem.as_node()) {
                log::debug!("skipping detached {kind:?} match inside captured content");
                continue;
            }
            let mut attrs = elem.attributes.borrow_mut();
            if is_marked(&attrs, config) {
                continue;
            }
            let Some(reference) = attrs.get(rule.attribute.as_str()).map(str::to_owned) else {
                log::warn!(
                    "element matched \"{}\" but has no \"{}\" attribute, skipping",
                    rule.selector,
                    rule.attribute
                );
                continue;
            };
            let url = resolve_as_url(&reference, base)?;
            let id = ids.next_link();
            attrs.remove(rule.attribute.as_str());
            attrs.insert(config.link.marker_attr.as_str(), id.clone());
            log::debug!("extracted {kind:?} dependency {id} -> {url}");
            deps.group_mut(kind).push(LinkedDependency { id, url });
        }
    }
    log::debug!("linked extraction found {} dependencies", deps.len());
    Ok(deps)
}

/// Restore linked dependencies into a parsed stripped document.
///
/// `outputs` are the build step's rewritten paths, paired positionally with
/// [`LinkedDeps::iter`]. Every table entry must find its marker and every
/// marker must be consumed; either direction failing means the stripped
/// document was corrupted between extraction and reinsertion.
pub fn reinsert(
    doc: &HtmlDocument,
    deps: &LinkedDeps,
    outputs: &[String],
    config: &ExtractConfig,
) -> GraftResult<()> {
    if outputs.len() != deps.len() {
        return Err(GraftError::CountMismatch {
            expected: deps.len(),
            provided: outputs.len(),
        });
    }
    let mut by_id = marked_elements(doc, &config.link.marker_attr)?;
    for ((kind, dep), output) in deps.iter().zip(outputs) {
        let elem = by_id
            .remove(&dep.id)
            .ok_or_else(|| GraftError::MissingPlaceholder { id: dep.id.clone() })?;
        let rule = config.link.rule(kind);
        let mut attrs = elem.attributes.borrow_mut();
        attrs.insert(rule.attribute.as_str(), output.clone());
        attrs.remove(config.link.marker_attr.as_str());
        log::debug!("restored {kind:?} dependency {} -> {output}", dep.id);
    }
    if let Some(id) = by_id.into_keys().next() {
        return Err(GraftError::UnmatchedPlaceholder { id });
    }
    Ok(())
}

/// Text-level extraction: parse, strip, and serialize in one call.
///
/// `path` is the absolute path or URL of the HTML file, used to resolve
/// relative references against its directory.
pub fn extract_html(
    html: &str,
    path: &str,
    config: &ExtractConfig,
) -> GraftResult<(String, LinkedDeps)> {
    let base = dir_url_from_file(path)?;
    let doc = HtmlDocument::parse(html);
    let mut ids = ResourceIds::new();
    let deps = extract(&doc, &base, &mut ids, config)?;
    Ok((doc.serialize()?, deps))
}

/// Text-level reinsertion: parse the stripped text, restore, and serialize.
pub fn reinsert_html(
    html: &str,
    deps: &LinkedDeps,
    outputs: &[String],
    config: &ExtractConfig,
) -> GraftResult<String> {
    let doc = HtmlDocument::parse(html);
    reinsert(&doc, deps, outputs, config)?;
    doc.serialize()
}
