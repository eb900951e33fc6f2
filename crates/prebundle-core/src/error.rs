use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes, surfaced in JSON output.
pub mod codes {
    pub const ENTRY_METADATA_MISSING: &str = "ENTRY_METADATA_MISSING";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const INVALID_FILTER: &str = "INVALID_FILTER";
    pub const MANIFEST_READ: &str = "MANIFEST_READ";
    pub const MANIFEST_PARSE: &str = "MANIFEST_PARSE";
}

/// Core error type for pre-bundle hook operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A `dep` namespace load named an id the scanner never recorded.
    ///
    /// The scanner guarantees every routed entry has both a file path and
    /// exports data, so this is a broken precondition rather than bad input.
    #[error("Pre-bundle entry '{id}' has no {missing} (dependency scan output is inconsistent)")]
    EntryMetadataMissing { id: String, missing: &'static str },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid hook filter `{pattern}`: {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error("Failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    #[must_use]
    pub fn entry_metadata_missing(id: &str, missing: &'static str) -> Self {
        Self::EntryMetadataMissing {
            id: id.to_string(),
            missing,
        }
    }

    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EntryMetadataMissing { .. } => codes::ENTRY_METADATA_MISSING,
            Self::Io { .. } => codes::IO_ERROR,
            Self::InvalidFilter { .. } => codes::INVALID_FILTER,
            Self::ManifestRead { .. } => codes::MANIFEST_READ,
            Self::ManifestParse { .. } => codes::MANIFEST_PARSE,
        }
    }

    /// Path associated with the error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. } | Self::ManifestRead { path, .. } | Self::ManifestParse { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
