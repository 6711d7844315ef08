//! Extraction configuration
//!
//! Selector/attribute rules for every resource kind plus the marker-attribute
//! names carried by stripped elements. Configurations are validated at
//! construction time so malformed selectors or colliding marker attributes
//! surface immediately instead of deep inside a document scan.

use kuchiki::Selectors;
use serde::{Deserialize, Serialize};

use crate::deps::inlined::InlineKind;
use crate::deps::linked::LinkKind;
use crate::error::{GraftError, GraftResult};

/// Default marker attribute carrying a linked resource's id.
pub const DEFAULT_LINK_MARKER_ATTR: &str = "res-link";

/// Default marker attribute carrying an inlined resource's id.
pub const DEFAULT_INLINE_MARKER_ATTR: &str = "res-inline";

/// Which elements to pick for one linked kind, and which attribute of theirs
/// carries the resource reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRule {
    /// CSS selector picking the dependency element, e.g. `script[src]`
    pub selector: String,
    /// Attribute holding the URL or path, e.g. `src`
    pub attribute: String,
}

impl LinkRule {
    fn new(selector: &str, attribute: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

/// Which elements to pick for one inlined kind. The payload is the element's
/// embedded content, so no attribute is involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineRule {
    /// CSS selector picking the dependency element, e.g. `script:not([src])`
    pub selector: String,
}

impl InlineRule {
    fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
        }
    }
}

/// Configuration for linked (referenced) dependencies.
///
/// | kind       | selector                       | example                                     |
/// |------------|--------------------------------|---------------------------------------------|
/// | script     | `script[src]`                  | `<script src="./app.js"></script>`          |
/// | stylesheet | `link[rel="stylesheet"][href]` | `<link rel="stylesheet" href="styles.css">` |
/// | image      | `img[src]`                     | `<img src="logo.png">`, `data:` images too  |
/// | icon       | `link[rel~="icon"][href]`      | `<link rel="icon" href="../favicon.ico">`   |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDepsConfig {
    /// Attribute set on a stripped element to carry its resource id
    pub marker_attr: String,
    pub scripts: LinkRule,
    pub styles: LinkRule,
    pub images: LinkRule,
    pub icons: LinkRule,
}

impl Default for LinkDepsConfig {
    fn default() -> Self {
        Self {
            marker_attr: DEFAULT_LINK_MARKER_ATTR.to_string(),
            scripts: LinkRule::new("script[src]", "src"),
            styles: LinkRule::new(r#"link[rel="stylesheet"][href]"#, "href"),
            images: LinkRule::new("img[src]", "src"),
            icons: LinkRule::new(r#"link[rel~="icon"][href]"#, "href"),
        }
    }
}

impl LinkDepsConfig {
    /// The rule for one linked kind.
    #[must_use]
    pub fn rule(&self, kind: LinkKind) -> &LinkRule {
        match kind {
            LinkKind::Script => &self.scripts,
            LinkKind::Stylesheet => &self.styles,
            LinkKind::Image => &self.images,
            LinkKind::Icon => &self.icons,
        }
    }
}

/// Configuration for inlined dependencies.
///
/// | kind   | selector            | example                                 |
/// |--------|---------------------|-----------------------------------------|
/// | script | `script:not([src])` | `<script>console.log("hi")</script>`    |
/// | style  | `style`             | `<style>body { … }</style>`             |
/// | svg    | `svg`               | `<svg xmlns="…"><circle … /></svg>`     |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineDepsConfig {
    /// Attribute set on a cleared element to carry its resource id
    pub marker_attr: String,
    pub scripts: InlineRule,
    pub styles: InlineRule,
    pub svgs: InlineRule,
}

impl Default for InlineDepsConfig {
    fn default() -> Self {
        Self {
            marker_attr: DEFAULT_INLINE_MARKER_ATTR.to_string(),
            scripts: InlineRule::new("script:not([src])"),
            styles: InlineRule::new("style"),
            svgs: InlineRule::new("svg"),
        }
    }
}

impl InlineDepsConfig {
    /// The rule for one inlined kind.
    #[must_use]
    pub fn rule(&self, kind: InlineKind) -> &InlineRule {
        match kind {
            InlineKind::Script => &self.scripts,
            InlineKind::Style => &self.styles,
            InlineKind::Svg => &self.svgs,
        }
    }
}

/// Combined link + inline configuration for one extraction session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub link: LinkDepsConfig,
    pub inline: InlineDepsConfig,
}

impl ExtractConfig {
    /// Validate marker attributes and selectors.
    ///
    /// Rejects empty or colliding marker attributes, a marker that shadows a
    /// resource-bearing attribute (stripping would then destroy the marker),
    /// empty resource attributes, and selectors that fail to compile.
    pub fn validate(&self) -> GraftResult<()> {
        let link_marker = self.link.marker_attr.as_str();
        let inline_marker = self.inline.marker_attr.as_str();
        if link_marker.is_empty() || inline_marker.is_empty() {
            return Err(GraftError::EmptyMarkerAttr);
        }
        if link_marker.eq_ignore_ascii_case(inline_marker) {
            return Err(GraftError::MarkerAttrCollision(link_marker.to_string()));
        }
        // marker attributes double as lookup selectors during reinsertion
        for marker in [link_marker, inline_marker] {
            let lookup = format!("[{marker}]");
            Selectors::compile(&lookup).map_err(|()| GraftError::InvalidSelector(lookup))?;
        }
        for kind in LinkKind::ALL {
            let rule = self.link.rule(kind);
            if rule.attribute.is_empty() {
                return Err(GraftError::EmptyResourceAttribute(rule.selector.clone()));
            }
            for marker in [link_marker, inline_marker] {
                if marker.eq_ignore_ascii_case(&rule.attribute) {
                    return Err(GraftError::MarkerShadowsAttribute {
                        marker: marker.to_string(),
                        attribute: rule.attribute.clone(),
                    });
                }
            }
            Selectors::compile(&rule.selector)
                .map_err(|()| GraftError::InvalidSelector(rule.selector.clone()))?;
        }
        for kind in InlineKind::ALL {
            let rule = self.inline.rule(kind);
            Selectors::compile(&rule.selector)
                .map_err(|()| GraftError::InvalidSelector(rule.selector.clone()))?;
        }
        Ok(())
    }
}
