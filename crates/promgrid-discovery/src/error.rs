//! Error types for discovery-file projection.

use std::path::PathBuf;

use promgrid_state::StateError;
use thiserror::Error;

/// Result type alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors that can occur while projecting discovery files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The store read or write behind a mutation failed; no file was touched.
    #[error(transparent)]
    Store(#[from] StateError),

    /// The exporter names the output file and must be a single path component.
    #[error("exporter {0:?} is not a valid file name")]
    InvalidExporter(String),

    /// A record reached the registry without one of its identity labels.
    #[error("record {exporter}/{target} is missing identity label {label:?}")]
    MissingIdentityLabel {
        exporter: String,
        target: String,
        label: &'static str,
    },

    #[error("failed to serialize discovery groups: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
