/// What a run is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Derive fresh secrets and store them, never read.
    Generate,

    /// Read and cross check, never write.
    Retrieve,

    /// Read and cross check, then store whatever could be derived but
    /// was not retrieved.
    Complete,
}

impl Mode {
    /// Whether stored values are read.
    pub fn retrieves(&self) -> bool {
        !matches!(self, Mode::Generate)
    }

    /// Whether derived values that were not retrieved are stored.
    pub fn backfills(&self) -> bool {
        !matches!(self, Mode::Retrieve)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mode::Generate => "generate",
            Mode::Retrieve => "retrieve",
            Mode::Complete => "complete",
        })
    }
}
