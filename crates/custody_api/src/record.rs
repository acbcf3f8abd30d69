use crate::*;
use sha3::{Digest, Sha3_512};
use std::collections::BTreeMap;

/// Hex encoded SHA3-512 digest.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha3_512::digest(bytes))
}

/// Length and digest of one stored piece.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceDigest {
    /// byte length of the piece
    pub length: usize,

    /// hex SHA3-512 of the piece
    pub signature: String,
}

impl PieceDigest {
    /// Digest the given bytes.
    pub fn of(bytes: &[u8]) -> Self {
        Self {
            length: bytes.len(),
            signature: digest(bytes),
        }
    }

    /// True if the bytes have the recorded length and digest.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        self.length == bytes.len() && self.signature == digest(bytes)
    }
}

/// The open, non secret, description of one stored secret.
///
/// Written pretty-printed as JSON to `<open dir>/<logical path>.json`:
///
/// ```json
/// {
///   "length": 119,
///   "signature": "<hex sha3-512 of the content>",
///   "type": "string",
///   "storagePieces": {
///     "<piece storage path>": { "length": 138, "signature": "<hex>" }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityRecord {
    /// byte length of the content
    pub length: usize,

    /// hex SHA3-512 of the content
    pub signature: String,

    /// whether the content was text or raw bytes
    pub r#type: ContentType,

    /// every piece the scheme produced, keyed by storage path
    pub storage_pieces: BTreeMap<String, PieceDigest>,
}

impl IntegrityRecord {
    /// Describe a secret and the pieces it was split into.
    pub fn new(secret: &Secret, pieces: &Pieces) -> Self {
        Self {
            length: secret.len(),
            signature: digest(secret.as_bytes()),
            r#type: secret.content_type(),
            storage_pieces: pieces
                .iter()
                .map(|(path, bytes)| (path.clone(), PieceDigest::of(bytes)))
                .collect(),
        }
    }

    /// True if reconstructed content has the recorded length and digest.
    pub fn matches_content(&self, content: &[u8]) -> bool {
        self.length == content.len() && self.signature == digest(content)
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(StoreError::other)
    }
}
