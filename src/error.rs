//! Error types for extraction and reinsertion
//!
//! All failures in this crate are deterministic data- or document-shape
//! errors; none are transient, so there is no retry machinery anywhere.

use thiserror::Error;

/// Result type alias for extraction/reinsertion operations
pub type GraftResult<T> = Result<T, GraftError>;

/// Error types for extraction and reinsertion operations
#[derive(Debug, Error)]
pub enum GraftError {
    /// Reinsertion could not find an element for a recorded resource id
    #[error("no element in the document carries resource id \"{id}\"")]
    MissingPlaceholder { id: String },

    /// A marker survived reinsertion with no entry in the resource table
    #[error("marker \"{id}\" has no matching entry in the resource table")]
    UnmatchedPlaceholder { id: String },

    /// Transformed outputs do not pair up with the extracted inputs
    #[error("resource table holds {expected} entries but {provided} transformed outputs were provided")]
    CountMismatch { expected: usize, provided: usize },

    /// A configured CSS selector failed to compile
    #[error("invalid css selector \"{0}\"")]
    InvalidSelector(String),

    /// A marker attribute name was left empty
    #[error("marker attribute names must not be empty")]
    EmptyMarkerAttr,

    /// The link and inline configurations share one marker attribute
    #[error("marker attribute \"{0}\" is used by both the link and inline configurations")]
    MarkerAttrCollision(String),

    /// A marker attribute shadows a resource-bearing attribute
    #[error("marker attribute \"{marker}\" collides with the \"{attribute}\" resource attribute")]
    MarkerShadowsAttribute { marker: String, attribute: String },

    /// A link rule names no resource-bearing attribute
    #[error("rule \"{0}\" names no resource attribute")]
    EmptyResourceAttribute(String),

    /// A reference could not be resolved against the document base
    #[error("failed to resolve \"{reference}\" against \"{base}\": {source}")]
    UrlResolve {
        reference: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    /// The given path or URL cannot serve as a base for relative references
    #[error("\"{0}\" cannot serve as a base for relative references")]
    NotABase(String),

    /// Transformed inline content is not valid UTF-8
    #[error("transformed content for \"{id}\" is not valid utf-8")]
    ContentEncoding { id: String },

    /// IO error while serializing a document tree
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialized markup is not valid UTF-8
    #[error("serialized markup is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
