//! Per-document orchestration of the extract → build → reinsert round trip
//!
//! [`HtmlLoader::extract`] parses once, runs the linked pass then the inlined
//! pass sharing one id allocator, and serializes the stripped document. The
//! external build step consumes the stripped text and the grouped tables and
//! produces an output path per linked reference and transformed bytes per
//! inlined resource. [`HtmlLoader::reinsert`] reparses the stripped text,
//! restores both passes, and serializes the final document.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ExtractConfig;
use crate::deps::linked::LinkedDeps;
use crate::deps::inlined::InlinedDeps;
use crate::deps::{ResourceIds, inlined, linked};
use crate::document::HtmlDocument;
use crate::error::GraftResult;
use crate::resolve::dir_url_from_file;

/// A stripped document plus its extracted resource tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedHtml {
    /// Serialized stripped document, markers in place of resources
    pub html: String,
    pub linked: LinkedDeps,
    pub inlined: InlinedDeps,
}

impl ExtractedHtml {
    /// Outputs that reproduce the document unchanged: every linked reference
    /// keeps its resolved URL, every inlined resource keeps its captured
    /// bytes. Useful for pass-through builds and round-trip checks.
    #[must_use]
    pub fn identity_outputs(&self) -> BuildOutputs {
        BuildOutputs {
            link_paths: self.linked.resolved_urls(),
            inline_contents: self.inlined.captured_contents(),
        }
    }
}

/// The build step's transformed outputs, paired positionally with the
/// deterministic flattening order of the extracted tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildOutputs {
    /// One output path or URL per linked dependency
    pub link_paths: Vec<String>,
    /// One transformed content per inlined resource
    pub inline_contents: Vec<Vec<u8>>,
}

/// Extraction/reinsertion pipeline for HTML documents.
///
/// A loader is a validated configuration and nothing more; each call owns its
/// own document and id allocator, so one loader may serve many documents,
/// concurrently if the caller schedules it that way.
#[derive(Debug, Clone, Default)]
pub struct HtmlLoader {
    config: ExtractConfig,
}

impl HtmlLoader {
    /// Create a loader, validating the configuration up front.
    pub fn new(config: ExtractConfig) -> GraftResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extract every linked and inlined dependency of `html`.
    ///
    /// `path` is the document's absolute path or URL; relative references
    /// resolve against its directory.
    pub fn extract(&self, html: &str, path: &str) -> GraftResult<ExtractedHtml> {
        let base = dir_url_from_file(path)?;
        self.extract_with_base(html, &base)
    }

    /// Like [`extract`](Self::extract), with the base directory URL already
    /// resolved by the caller.
    pub fn extract_with_base(&self, html: &str, base: &Url) -> GraftResult<ExtractedHtml> {
        let doc = HtmlDocument::parse(html);
        let mut ids = ResourceIds::new();
        let linked = linked::extract(&doc, base, &mut ids, &self.config)?;
        let inlined = inlined::extract(&doc, base, &mut ids, &self.config)?;
        Ok(ExtractedHtml {
            html: doc.serialize()?,
            linked,
            inlined,
        })
    }

    /// Reinsert transformed resources into the stripped text produced by
    /// [`extract`](Self::extract), yielding the final document.
    pub fn reinsert(
        &self,
        stripped_html: &str,
        linked_deps: &LinkedDeps,
        inlined_deps: &InlinedDeps,
        outputs: &BuildOutputs,
    ) -> GraftResult<String> {
        let doc = HtmlDocument::parse(stripped_html);
        linked::reinsert(&doc, linked_deps, &outputs.link_paths, &self.config)?;
        inlined::reinsert(&doc, inlined_deps, &outputs.inline_contents, &self.config)?;
        doc.serialize()
    }
}
