//! URL and path resolution
//!
//! Resolves possibly-relative references against a base directory URL. A
//! reference is treated as relative unless its leading scheme is in the known
//! non-relative scheme table, which also covers the two synthetic schemes used
//! to tag extracted resources (`link://`, `inline://`). Path-joining utilities
//! elsewhere must agree with the resolver, so the scheme table is exposed
//! through the pure [`uri_scheme_of`] / [`is_absolute_path`] predicates.

use url::Url;

use crate::deps::{INLINE_ID_SCHEME, LINK_ID_SCHEME};
use crate::error::{GraftError, GraftResult};

/// Scheme classification of a reference string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriScheme {
    Http,
    Https,
    File,
    Data,
    Blob,
    Jsr,
    Npm,
    Node,
    /// Synthetic scheme tagging an extracted linked resource
    Link,
    /// Synthetic scheme tagging an extracted inlined resource
    Inline,
    /// Absolute filesystem path (leading slash or Windows drive letter)
    Local,
    /// Everything else; resolved against the base directory URL
    Relative,
}

const SCHEME_PREFIXES: &[(&str, UriScheme)] = &[
    ("http://", UriScheme::Http),
    ("https://", UriScheme::Https),
    ("file://", UriScheme::File),
    ("data:", UriScheme::Data),
    ("blob:", UriScheme::Blob),
    ("jsr:", UriScheme::Jsr),
    ("npm:", UriScheme::Npm),
    ("node:", UriScheme::Node),
    (LINK_ID_SCHEME, UriScheme::Link),
    (INLINE_ID_SCHEME, UriScheme::Inline),
];

/// Classify a reference string against the scheme table.
///
/// Unknown schemes deliberately fall through to `Relative`: only members of
/// the table are recognized as already-absolute.
#[must_use]
pub fn uri_scheme_of(segment: &str) -> UriScheme {
    for (prefix, scheme) in SCHEME_PREFIXES {
        // get() instead of slicing: the cut may land inside a multi-byte char
        if segment
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        {
            return *scheme;
        }
    }
    if segment.starts_with('/') || is_drive_letter_path(segment) {
        return UriScheme::Local;
    }
    UriScheme::Relative
}

/// True iff the segment does not need a base to resolve against.
///
/// Pure predicate over the same scheme table as [`uri_scheme_of`].
#[must_use]
pub fn is_absolute_path(segment: &str) -> bool {
    uri_scheme_of(segment) != UriScheme::Relative
}

/// `c:/...` or `c:\...`
fn is_drive_letter_path(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Turn an absolute filesystem path into a `file://` URL.
fn local_to_file_url(path: &str) -> GraftResult<Url> {
    let normalized = path.replace('\\', "/");
    let spec = if normalized.starts_with('/') {
        format!("file://{normalized}")
    } else {
        format!("file:///{normalized}")
    };
    Url::parse(&spec).map_err(|source| GraftError::UrlResolve {
        reference: path.to_string(),
        base: String::new(),
        source,
    })
}

/// Resolve a reference string to an absolute URL.
///
/// Relative references join against `base`; absolute filesystem paths become
/// `file://` URLs on their own; references carrying a known scheme parse
/// standalone and ignore `base` entirely.
pub fn resolve_as_url(reference: &str, base: &Url) -> GraftResult<Url> {
    match uri_scheme_of(reference) {
        UriScheme::Relative => base.join(reference).map_err(|source| GraftError::UrlResolve {
            reference: reference.to_string(),
            base: base.to_string(),
            source,
        }),
        UriScheme::Local => local_to_file_url(reference),
        _ => Url::parse(reference).map_err(|source| GraftError::UrlResolve {
            reference: reference.to_string(),
            base: base.to_string(),
            source,
        }),
    }
}

/// Infer the directory URL of a document from its path or URL string.
///
/// The result always carries a trailing slash, so relative references inside
/// the document resolve against its directory rather than the file itself.
/// Relative paths are taken to be relative to the process working directory,
/// matching the behavior for callers that load something like `./index.html`.
pub fn dir_url_from_file(path: &str) -> GraftResult<Url> {
    let file_url = match uri_scheme_of(path) {
        UriScheme::Relative => {
            let cwd = std::env::current_dir()?;
            let base = Url::from_directory_path(&cwd)
                .map_err(|()| GraftError::NotABase(cwd.display().to_string()))?;
            base.join(path).map_err(|source| GraftError::UrlResolve {
                reference: path.to_string(),
                base: base.to_string(),
                source,
            })?
        }
        UriScheme::Local => local_to_file_url(path)?,
        _ => Url::parse(path).map_err(|source| GraftError::UrlResolve {
            reference: path.to_string(),
            base: String::new(),
            source,
        })?,
    };
    file_url
        .join("./")
        .map_err(|_| GraftError::NotABase(file_url.to_string()))
}
