use crate::*;
use zeroize::Zeroizing;

/// Whether stored content is text or raw bytes.
///
/// Kept in the integrity record so retrieval hands back the same kind
/// of value that was stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum ContentType {
    /// utf8 text
    #[serde(rename = "string")]
    Text,

    /// raw bytes
    #[serde(rename = "Buffer")]
    Bytes,
}

/// A secret value handed to or returned from the storage manager.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    /// utf8 text, e.g. a mnemonic phrase or a serialized key
    Text(Zeroizing<String>),

    /// raw bytes, e.g. a derived seed
    Bytes(SecretBytes),
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret::{:?}(<{} bytes>)", self.content_type(), self.len())
    }
}

impl Secret {
    /// Wrap text.
    pub fn text(s: impl Into<String>) -> Self {
        Secret::Text(Zeroizing::new(s.into()))
    }

    /// Wrap raw bytes.
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Secret::Bytes(SecretBytes::new(b.into()))
    }

    /// Rebuild a secret of the given type from reconstructed bytes.
    pub fn from_content(
        content_type: ContentType,
        content: SecretBytes,
    ) -> StoreResult<Self> {
        Ok(match content_type {
            ContentType::Bytes => Secret::Bytes(content),
            ContentType::Text => {
                let text = std::str::from_utf8(&content).map_err(|_| {
                    StoreError::other("string content is not valid utf8")
                })?;
                Secret::text(text)
            }
        })
    }

    /// The type recorded for this secret.
    pub fn content_type(&self) -> ContentType {
        match self {
            Secret::Text(_) => ContentType::Text,
            Secret::Bytes(_) => ContentType::Bytes,
        }
    }

    /// The stored representation.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Secret::Text(s) => s.as_bytes(),
            Secret::Bytes(b) => b.as_slice(),
        }
    }

    /// Text content, `None` for byte secrets.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Secret::Text(s) => Some(s.as_str()),
            Secret::Bytes(_) => None,
        }
    }

    /// Length of the stored representation.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// True if the stored representation is empty.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags() {
        assert_eq!(
            "\"string\"",
            serde_json::to_string(&ContentType::Text).unwrap()
        );
        assert_eq!(
            "\"Buffer\"",
            serde_json::to_string(&ContentType::Bytes).unwrap()
        );
    }

    #[test]
    fn text_and_bytes_differ() {
        assert_ne!(Secret::text("ab"), Secret::bytes(b"ab".to_vec()));
        assert_eq!(Secret::text("ab").as_bytes(), b"ab");
    }

    #[test]
    fn debug_hides_content() {
        let dbg = format!("{:?}", Secret::text("hunter2"));
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("7 bytes"));
    }

    #[test]
    fn text_must_be_utf8() {
        assert!(Secret::from_content(
            ContentType::Text,
            SecretBytes::new(vec![0xff])
        )
        .is_err());
        assert_eq!(
            Secret::bytes(vec![0xff]),
            Secret::from_content(
                ContentType::Bytes,
                SecretBytes::new(vec![0xff])
            )
            .unwrap()
        );
    }
}
