/// Splitting scheme error type.
///
/// These are precondition or configuration failures. Pieces that are
/// missing or disagree are not errors, they are reported through
/// [crate::Reconstruction].
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// No scheme is registered under this tag.
    #[error("unknown storage scheme: {0}")]
    UnknownScheme(String),

    /// The scheme parameters cannot be used.
    #[error("invalid {scheme} parameters: {reason}")]
    InvalidParameters {
        /// tag of the offending scheme
        scheme: &'static str,
        /// what is wrong with the parameters
        reason: String,
    },

    /// Word splitting requires exactly 12 single-space separated words.
    #[error("content is not a 12 word phrase separated by single spaces")]
    MalformedPhrase,

    /// More pieces were handed to combine than the scheme ever produces.
    #[error("{scheme} got {count} pieces for {path}, it never produces more than {max}")]
    UnexpectedPieceCount {
        /// tag of the scheme
        scheme: &'static str,
        /// logical path being combined
        path: String,
        /// pieces received
        count: usize,
        /// pieces the scheme produces
        max: usize,
    },

    /// Freshly generated shares did not combine back to the content.
    #[error("threshold shares for {0} failed the split self-check, refusing to store them")]
    SelfCheck(String),

    /// Unspecified internal error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl SplitError {
    /// Build an "Other" type SplitError.
    pub fn other(
        e: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SplitError::Other(e.into())
    }
}

/// Splitting scheme result type.
pub type SplitResult<T> = Result<T, SplitError>;
