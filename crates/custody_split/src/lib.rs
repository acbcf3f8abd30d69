#![deny(missing_docs)]
#![deny(unsafe_code)]
//! Secret splitting schemes for offline key custody.
//!
//! A [Scheme] turns one logical secret into a set of named pieces
//! ([Scheme::split]) and turns whatever pieces are still available back
//! into the secret ([Scheme::combine]). The set of schemes is closed:
//!
//! - `clear` - a single piece holding the content verbatim
//! - `shamir-secret-sharing` - K-of-N threshold shares, every K-subset
//!   of the available shares must agree
//! - `bip39-mnemonic-2of3` - a 12 word phrase spread over 3 pieces,
//!   any 2 of which cover all 12 words
//!
//! Handlers hold no state; persisting pieces and checking them against
//! an integrity record is the job of the storage layer.

use std::collections::BTreeMap;

mod error;
pub use error::*;

mod reconstruction;
pub use reconstruction::*;

mod scheme;
pub use scheme::*;

/// Secret bytes, zeroed when dropped.
pub type SecretBytes = zeroize::Zeroizing<Vec<u8>>;

/// Pieces keyed by their storage path (destination + logical path).
pub type Pieces = BTreeMap<String, SecretBytes>;

/// Join a scheme destination and a logical path into a piece storage path.
pub fn piece_path(destination: &str, logical_path: &str) -> String {
    let destination = destination.trim_end_matches('/');
    let logical_path = logical_path.trim_start_matches('/');
    if destination.is_empty() {
        logical_path.to_string()
    } else {
        format!("{destination}/{logical_path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_path_joins_with_single_slash() {
        assert_eq!("TW/root/a/seed.txt", piece_path("TW/", "/root/a/seed.txt"));
        assert_eq!("HK/x", piece_path("HK", "x"));
        assert_eq!("x", piece_path("", "x"));
    }
}
