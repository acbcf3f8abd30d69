use crate::SecretBytes;

/// Outcome of combining the pieces of one logical secret.
#[derive(Clone, PartialEq, Eq)]
pub enum Reconstruction {
    /// The pieces reconstructed this content.
    Ok(SecretBytes),

    /// Not enough pieces are present to reconstruct.
    Missing(String),

    /// Pieces are present but disagree with each other.
    Inconsistent(String),
}

impl Reconstruction {
    /// True if content was reconstructed.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// The reconstructed content, if any.
    pub fn content(&self) -> Option<&[u8]> {
        match self {
            Self::Ok(content) => Some(content.as_slice()),
            _ => None,
        }
    }

    /// Consume this outcome, keeping only the reconstructed content.
    pub fn into_content(self) -> Option<SecretBytes> {
        match self {
            Self::Ok(content) => Some(content),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Reconstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok(content) => {
                write!(f, "Reconstruction::Ok(<{} bytes>)", content.len())
            }
            Self::Missing(detail) => {
                f.debug_tuple("Reconstruction::Missing").field(detail).finish()
            }
            Self::Inconsistent(detail) => f
                .debug_tuple("Reconstruction::Inconsistent")
                .field(detail)
                .finish(),
        }
    }
}

impl std::fmt::Display for Reconstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok(_) => f.write_str("OK"),
            Self::Missing(detail) => write!(f, "MISSING {detail}"),
            Self::Inconsistent(detail) => write!(f, "INCONSISTENT {detail}"),
        }
    }
}
