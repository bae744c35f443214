//! Error types shared by the extraction pipeline and the report generator.

use std::path::PathBuf;

/// Result alias defaulting to [`ExtractError`].
pub type Result<T, E = ExtractError> = std::result::Result<T, E>;

/// Failures that can occur while reading the corpus or writing output.
///
/// Most of these are recoverable at the level of a single file: the pipeline
/// logs them and carries on with the next book.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// A file could not be opened or created.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dictionary or book file is not well-formed markup.
    #[error("malformed markup in {}: {source}", path.display())]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: MarkupError,
    },

    /// The book-map override could not be read or parsed.
    #[error("invalid book map {}: {message}", path.display())]
    BookMap { path: PathBuf, message: String },

    /// Reading or writing the tabular file failed.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The external typesetter could not be located or started.
    #[error("typesetter `{program}` unavailable: {message}")]
    Typesetter { program: String, message: String },
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, source: MarkupError) -> Self {
        Self::MalformedSource {
            path: path.into(),
            source,
        }
    }
}

/// Why a markup document was rejected.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("invalid attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("document ended with {0} unclosed element(s)")]
    Unclosed(usize),

    #[error("document has no root element")]
    NoRoot,

    #[error("content after the root element")]
    TrailingContent,

    #[error("undeclared namespace prefix `{0}`")]
    UnboundPrefix(String),
}
