use custody_api::StoreError;

/// Key derivation or signature provider error.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    /// Mnemonic generation or parsing failed.
    #[error("mnemonic error: {0}")]
    Mnemonic(String),

    /// Extended key construction, parsing or derivation failed.
    #[error("key derivation error: {0}")]
    Key(String),

    /// Signing or signature recovery failed.
    #[error("signature error: {0}")]
    Signature(String),
}

/// Derivation result type.
pub type DeriveResult<T> = Result<T, DeriveError>;

/// Keytool run error type. Every variant aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The output or input directories are not in the state the mode
    /// requires.
    #[error("{0}")]
    Precondition(String),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Provider failure.
    #[error(transparent)]
    Derive(#[from] DeriveError),

    /// A freshly derived value differs from the stored one.
    #[error("re-generated content does not match retrieved content at {0}")]
    DerivedMismatch(String),

    /// Two independent computations of the same value disagree.
    #[error("verification {check} failed at {path}")]
    Verify {
        /// name of the cross check
        check: &'static str,
        /// seed, purpose or child the check was about
        path: String,
    },

    /// A retrieved value is not what its logical path should hold.
    #[error("{path} does not hold a valid {expected}")]
    Malformed {
        /// logical path of the value
        path: String,
        /// what was expected there
        expected: &'static str,
    },

    /// Unspecified internal error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl RunError {
    /// Build an "Other" type RunError.
    pub fn other(
        e: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RunError::Other(e.into())
    }
}

impl From<String> for RunError {
    fn from(s: String) -> Self {
        RunError::other(s)
    }
}

impl From<&str> for RunError {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}

/// Run result type.
pub type RunResult<T> = Result<T, RunError>;
