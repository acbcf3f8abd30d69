use crate::*;

mod clear;
mod combinations;
mod threshold;
mod word_split;

pub use word_split::{PIECE_POSITIONS, WORD_COUNT};

/// Tag of the [Scheme::Clear] variant.
pub const CLEAR_TAG: &str = "clear";

/// Tag of the [Scheme::Threshold] variant.
pub const THRESHOLD_TAG: &str = "shamir-secret-sharing";

/// Tag of the [Scheme::WordSplit] variant.
pub const WORD_SPLIT_TAG: &str = "bip39-mnemonic-2of3";

/// Store the content as-is under a single base path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearScheme {
    /// destination of the one piece
    pub base_path: String,
}

/// K-of-N threshold secret sharing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdScheme {
    /// N, shares produced
    pub total_shares: u8,
    /// K, shares required to reconstruct
    pub threshold: u8,
    /// one destination per share, in share order
    pub destinations: Vec<String>,
}

/// A 12 word phrase spread over 3 pieces, any 2 of which suffice.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSplitScheme {
    /// exactly 3 destinations, in piece order
    pub destinations: Vec<String>,
}

/// How one logical secret is stored.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "scheme")]
pub enum Scheme {
    /// Unsplit content.
    #[serde(rename = "clear")]
    Clear(ClearScheme),

    /// Threshold secret sharing.
    #[serde(rename = "shamir-secret-sharing")]
    Threshold(ThresholdScheme),

    /// Fixed 2-of-3 word split.
    #[serde(rename = "bip39-mnemonic-2of3")]
    WordSplit(WordSplitScheme),
}

#[derive(serde::Deserialize)]
struct RawScheme {
    scheme: String,
    #[serde(flatten)]
    params: serde_json::Map<String, serde_json::Value>,
}

impl<'de> serde::Deserialize<'de> for Scheme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let RawScheme { scheme, params } =
            serde::Deserialize::deserialize(deserializer)?;
        Scheme::from_tag(&scheme, params).map_err(serde::de::Error::custom)
    }
}

fn parse_params<T>(
    tag: &'static str,
    params: serde_json::Map<String, serde_json::Value>,
) -> SplitResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(serde_json::Value::Object(params)).map_err(|e| {
        SplitError::InvalidParameters {
            scheme: tag,
            reason: e.to_string(),
        }
    })
}

/// Destinations are joined below the production root, so they must be
/// non-empty relative paths without `..`.
fn check_destination(tag: &'static str, destination: &str) -> SplitResult<()> {
    use std::path::{Component, Path};
    let mut normal = false;
    for component in Path::new(destination).components() {
        match component {
            Component::Normal(_) => normal = true,
            Component::CurDir => (),
            _ => {
                normal = false;
                break;
            }
        }
    }
    if !normal {
        return Err(SplitError::InvalidParameters {
            scheme: tag,
            reason: format!(
                "destination {destination:?} must be a relative path below the product dir"
            ),
        });
    }
    Ok(())
}

fn check_distinct(tag: &'static str, destinations: &[String]) -> SplitResult<()> {
    for (i, d) in destinations.iter().enumerate() {
        check_destination(tag, d)?;
        if destinations[..i].contains(d) {
            return Err(SplitError::InvalidParameters {
                scheme: tag,
                reason: format!("destination {d:?} listed twice"),
            });
        }
    }
    Ok(())
}

impl Scheme {
    /// Resolve a scheme by tag name and untyped parameters,
    /// then validate the typed result.
    pub fn from_tag(
        tag: &str,
        params: serde_json::Map<String, serde_json::Value>,
    ) -> SplitResult<Self> {
        let scheme = match tag {
            CLEAR_TAG => Scheme::Clear(parse_params(CLEAR_TAG, params)?),
            THRESHOLD_TAG => {
                Scheme::Threshold(parse_params(THRESHOLD_TAG, params)?)
            }
            WORD_SPLIT_TAG => {
                Scheme::WordSplit(parse_params(WORD_SPLIT_TAG, params)?)
            }
            oth => return Err(SplitError::UnknownScheme(oth.to_string())),
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// The tag this scheme is registered under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clear(_) => CLEAR_TAG,
            Self::Threshold(_) => THRESHOLD_TAG,
            Self::WordSplit(_) => WORD_SPLIT_TAG,
        }
    }

    /// Check the parameters can actually be used to split and combine.
    pub fn validate(&self) -> SplitResult<()> {
        let invalid = |reason: String| SplitError::InvalidParameters {
            scheme: self.name(),
            reason,
        };
        match self {
            Self::Clear(s) => check_destination(CLEAR_TAG, &s.base_path),
            Self::Threshold(s) => {
                if s.threshold < 2 {
                    return Err(invalid(format!(
                        "threshold must be at least 2, got {}",
                        s.threshold
                    )));
                }
                if s.threshold > s.total_shares {
                    return Err(invalid(format!(
                        "threshold {} exceeds total shares {}",
                        s.threshold, s.total_shares
                    )));
                }
                if s.destinations.len() != s.total_shares as usize {
                    return Err(invalid(format!(
                        "{} destinations for {} shares",
                        s.destinations.len(),
                        s.total_shares
                    )));
                }
                check_distinct(THRESHOLD_TAG, &s.destinations)
            }
            Self::WordSplit(s) => {
                if s.destinations.len() != PIECE_POSITIONS.len() {
                    return Err(invalid(format!(
                        "expected {} destinations, got {}",
                        PIECE_POSITIONS.len(),
                        s.destinations.len()
                    )));
                }
                check_distinct(WORD_SPLIT_TAG, &s.destinations)
            }
        }
    }

    /// Piece storage paths this scheme produces for a logical path.
    pub fn piece_paths(&self, logical_path: &str) -> Vec<String> {
        match self {
            Self::Clear(s) => vec![piece_path(&s.base_path, logical_path)],
            Self::Threshold(ThresholdScheme { destinations, .. })
            | Self::WordSplit(WordSplitScheme { destinations }) => destinations
                .iter()
                .map(|d| piece_path(d, logical_path))
                .collect(),
        }
    }

    /// Transform content into pieces.
    pub fn split(&self, content: &[u8], logical_path: &str) -> SplitResult<Pieces> {
        tracing::trace!(scheme = self.name(), logical_path, "split");
        match self {
            Self::Clear(s) => Ok(clear::split(s, content, logical_path)),
            Self::Threshold(s) => threshold::split(s, content, logical_path),
            Self::WordSplit(s) => word_split::split(s, content, logical_path),
        }
    }

    /// Reconstruct content from the pieces that are present.
    ///
    /// Only pieces that passed their individual integrity check
    /// should be handed in here.
    pub fn combine(
        &self,
        pieces: &Pieces,
        logical_path: &str,
    ) -> SplitResult<Reconstruction> {
        tracing::trace!(
            scheme = self.name(),
            logical_path,
            present = pieces.len(),
            "combine"
        );
        match self {
            Self::Clear(_) => clear::combine(pieces, logical_path),
            Self::Threshold(s) => Ok(threshold::combine(s, pieces)),
            Self::WordSplit(_) => Ok(word_split::combine(pieces, logical_path)),
        }
    }
}
