use std::path::{Path, PathBuf};

/// Storage error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing store failed.
    #[error("io error at {path:?}: {source}")]
    Io {
        /// file or directory being accessed
        path: PathBuf,
        /// underlying error
        source: std::io::Error,
    },

    /// The scheme rejected its parameters or the content.
    #[error(transparent)]
    Split(#[from] custody_split::SplitError),

    /// An integrity record exists but cannot be used.
    #[error("integrity record {path:?} is unusable: {reason}")]
    CorruptRecord {
        /// location of the record
        path: PathBuf,
        /// what is wrong with it
        reason: String,
    },

    /// A logical or piece path would resolve outside its storage root.
    #[error("path {0:?} escapes its storage root")]
    UnsafePath(String),

    /// Unspecified internal error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Build an "Other" type StoreError.
    pub fn other(
        e: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        StoreError::Other(e.into())
    }

    /// Attach the path being accessed to an io error.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Storage result type.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type used at the configuration and command boundary.
pub type CustodyResult<T> = Result<T, one_err::OneErr>;
