use ferry_core::StoreKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors from the on-disk store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Data directory could not be created
    #[error("cannot create data directory {path}: {source}")]
    DataDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Reading or writing a dataset file failed
    #[error("{kind}: {source}")]
    Io {
        /// Dataset involved
        kind: StoreKind,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A dataset could not be encoded
    #[error("{kind}: cannot encode: {source}")]
    Encode {
        /// Dataset involved
        kind: StoreKind,
        /// Underlying serde error
        source: serde_json::Error,
    },

    /// A dataset file holds malformed JSON
    #[error("{kind}: malformed contents: {source}")]
    Decode {
        /// Dataset involved
        kind: StoreKind,
        /// Underlying serde error
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Dataset the error concerns, if any
    #[must_use]
    pub const fn store_kind(&self) -> Option<StoreKind> {
        match self {
            Self::DataDir { .. } => None,
            Self::Io { kind, .. } | Self::Encode { kind, .. } | Self::Decode { kind, .. } => {
                Some(*kind)
            }
        }
    }
}

impl From<StoreError> for ferry_core::FerryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DataDir { .. } => Self::Config(err.to_string()),
            StoreError::Io { kind, ref source } => Self::persistence(kind, source),
            StoreError::Encode { kind, ref source } | StoreError::Decode { kind, ref source } => {
                Self::persistence(kind, source)
            }
        }
    }
}
