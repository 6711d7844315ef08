//! Extract the linked and inlined resources of an HTML document, hand the
//! stripped document and the resource tables to an external build step, and
//! reinsert the transformed resources at their original locations.

pub mod config;
pub mod deps;
pub mod document;
pub mod error;
pub mod loader;
pub mod resolve;
pub mod template;

pub use config::{ExtractConfig, InlineDepsConfig, InlineRule, LinkDepsConfig, LinkRule};
pub use deps::inlined::{InlineKind, InlinedDeps, InlinedResource};
pub use deps::linked::{LinkKind, LinkedDependency, LinkedDeps};
pub use deps::{INLINE_ID_SCHEME, LINK_ID_SCHEME, ResourceIds};
pub use document::{DoctypeInfo, HtmlDocument};
pub use error::{GraftError, GraftResult};
pub use loader::{BuildOutputs, ExtractedHtml, HtmlLoader};
pub use resolve::{UriScheme, dir_url_from_file, is_absolute_path, resolve_as_url, uri_scheme_of};
pub use template::TemplateKvStorage;
