//! Error handling.

use std::{io, path::PathBuf, result::Result as StdResult};

/// Our result type.
pub type Result<T, E = Error> = StdResult<T, E>;

/// Errors which can be returned by this crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Removing the requested margins would leave nothing of the image.
    #[error("invalid dimensions for {}: {width}x{height}", .path.display())]
    #[non_exhaustive]
    InvalidDimensions {
        /// The image we tried to crop.
        path: PathBuf,
        /// The width left over after cropping. May be zero or negative.
        width: i64,
        /// The height left over after cropping. May be zero or negative.
        height: i64,
    },

    /// We were asked to write over our own input without permission.
    #[error("cannot overwrite {} without permission to overwrite", .path.display())]
    #[non_exhaustive]
    WriteConflict {
        /// The path we refused to write.
        path: PathBuf,
    },

    /// A filesystem operation failed.
    #[error("error accessing {}", .path.display())]
    #[non_exhaustive]
    Io {
        /// The file or directory we were working with.
        path: PathBuf,
        /// The original error.
        #[source]
        source: io::Error,
    },

    /// The image codec could not read or write an image.
    #[error("error processing image {}", .path.display())]
    #[non_exhaustive]
    Image {
        /// The image we were reading or writing.
        path: PathBuf,
        /// The original error.
        #[source]
        source: image::ImageError,
    },

    /// The XML parser or writer failed.
    #[error("could not process XML")]
    Xml(#[from] quick_xml::Error),

    /// The XML was well-formed token by token, but not as a whole document.
    #[error("malformed XML: {reason}")]
    #[non_exhaustive]
    MalformedXml {
        /// What was wrong.
        reason: String,
    },

    /// A path which should end in a file name doesn't.
    #[error("expected a file name, not {}", .path.display())]
    #[non_exhaustive]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
    },

    /// A required element was missing from the document.
    #[error("missing <{name}> element")]
    #[non_exhaustive]
    MissingElement {
        /// The name of the missing element.
        name: &'static str,
    },

    /// An attribute was missing or could not be parsed.
    #[error("invalid {name} attribute on <{element}>: {value:?}")]
    #[non_exhaustive]
    InvalidAttribute {
        /// The element carrying the attribute.
        element: String,
        /// The attribute name.
        name: &'static str,
        /// The raw value, if the attribute was present at all.
        value: Option<String>,
    },
}

impl Error {
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image<P: Into<PathBuf>>(path: P, source: image::ImageError) -> Self {
        Error::Image {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed<S: Into<String>>(reason: S) -> Self {
        Error::MalformedXml {
            reason: reason.into(),
        }
    }
}
