use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("track {0} not found")]
    TrackNotFound(String),

    #[error("track {0} already exists")]
    TrackExists(String),

    #[error("invalid track id {0:?}")]
    InvalidTrackId(String),

    #[error("failed to parse track document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
