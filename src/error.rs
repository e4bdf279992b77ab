//! Centralized error types for cloudseed.

use std::path::PathBuf;
use thiserror::Error;

use crate::filetype::FileType;

/// All errors produced by the cloudseed library.
#[derive(Error, Debug)]
pub enum UserDataError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A payload file given to one of the `*_from_path` helpers does
    /// not exist.
    #[error("payload file not found: {0}")]
    ResourceNotFound(PathBuf),

    /// A second part was added for a category that already has one.
    /// cloud-init consumers honor only a single part per content type,
    /// so a duplicate would be silently ignored at boot — reject it
    /// here instead of masking the caller bug.
    #[error("a {0} part has already been added")]
    DuplicateCategory(FileType),

    /// The charset label given to the builder is not a known encoding.
    #[error("unsupported charset label: '{0}'")]
    UnsupportedCharset(String),

    /// A payload file's bytes are not valid under the builder's charset.
    #[error("'{path}' is not valid {charset}")]
    PayloadDecode { path: PathBuf, charset: String },

    /// The MIME serialization step failed to encode a part's content
    /// under the builder's charset.
    #[error("cannot encode {category} content: {reason}")]
    Serialization { category: FileType, reason: String },
}

/// Convenience alias for `Result<T, UserDataError>`.
pub type Result<T> = std::result::Result<T, UserDataError>;

impl UserDataError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
