use super::*;
use std::collections::BTreeMap;
use zeroize::{Zeroize, Zeroizing};

/// Words in a phrase handled by the word split scheme.
pub const WORD_COUNT: usize = 12;

/// Word indices carried by each of the 3 pieces.
/// Any two rows together cover all of `0..12`.
pub const PIECE_POSITIONS: [[usize; 8]; 3] = [
    [0, 1, 2, 3, 4, 5, 6, 7],
    [4, 5, 6, 7, 8, 9, 10, 11],
    [0, 1, 2, 3, 8, 9, 10, 11],
];

#[derive(serde::Serialize, serde::Deserialize)]
struct WordPiece {
    path: String,
    words: BTreeMap<usize, String>,
}

impl Drop for WordPiece {
    fn drop(&mut self) {
        for word in self.words.values_mut() {
            word.zeroize();
        }
    }
}

fn split_phrase(content: &[u8]) -> SplitResult<Vec<&str>> {
    let phrase =
        std::str::from_utf8(content).map_err(|_| SplitError::MalformedPhrase)?;
    let words: Vec<&str> = phrase.split(' ').collect();
    if words.len() != WORD_COUNT
        || words
            .iter()
            .any(|w| w.is_empty() || w.chars().any(char::is_whitespace))
    {
        return Err(SplitError::MalformedPhrase);
    }
    Ok(words)
}

pub(crate) fn split(
    scheme: &WordSplitScheme,
    content: &[u8],
    logical_path: &str,
) -> SplitResult<Pieces> {
    let words = split_phrase(content)?;
    let mut out = Pieces::new();
    for (positions, destination) in
        PIECE_POSITIONS.iter().zip(scheme.destinations.iter())
    {
        let piece = WordPiece {
            path: logical_path.to_string(),
            words: positions
                .iter()
                .map(|&p| (p, words[p].to_string()))
                .collect(),
        };
        let json =
            serde_json::to_vec_pretty(&piece).map_err(SplitError::other)?;
        out.insert(piece_path(destination, logical_path), SecretBytes::new(json));
    }
    Ok(out)
}

pub(crate) fn combine(pieces: &Pieces, logical_path: &str) -> Reconstruction {
    let mut slots: Vec<Option<Zeroizing<String>>> = vec![None; WORD_COUNT];

    for (path, bytes) in pieces {
        let piece: WordPiece = match serde_json::from_slice(bytes) {
            Ok(piece) => piece,
            Err(e) => {
                return Reconstruction::Inconsistent(format!(
                    "unreadable word piece {path}: {e}"
                ))
            }
        };
        if piece.path != logical_path {
            return Reconstruction::Inconsistent(format!(
                "word piece {path} belongs to {}",
                piece.path
            ));
        }
        for (index, word) in piece.words.iter() {
            let slot = match slots.get_mut(*index) {
                Some(slot) => slot,
                None => {
                    return Reconstruction::Inconsistent(format!(
                        "word index {index} out of range in {path}"
                    ))
                }
            };
            if let Some(existing) = slot.as_deref() {
                if existing != word {
                    return Reconstruction::Inconsistent(format!(
                        "pieces disagree on word {index}"
                    ));
                }
            } else {
                *slot = Some(Zeroizing::new(word.clone()));
            }
        }
    }

    let filled = slots.iter().filter(|s| s.is_some()).count();
    if filled < WORD_COUNT {
        return Reconstruction::Missing(format!(
            "{filled} of {WORD_COUNT} words present"
        ));
    }

    let words: Vec<&str> = slots.iter().flatten().map(|w| w.as_str()).collect();
    let phrase = Zeroizing::new(words.join(" "));
    Reconstruction::Ok(SecretBytes::new(phrase.as_bytes().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "a b c d e f g h i j k l";

    fn scheme() -> Scheme {
        Scheme::WordSplit(WordSplitScheme {
            destinations: vec!["one".into(), "two".into(), "three".into()],
        })
    }

    #[test]
    fn any_two_rows_cover_every_index() {
        for a in 0..3 {
            for b in (a + 1)..3 {
                let mut seen = [false; WORD_COUNT];
                for p in PIECE_POSITIONS[a].iter().chain(PIECE_POSITIONS[b].iter()) {
                    seen[*p] = true;
                }
                assert!(seen.iter().all(|s| *s), "rows {a} and {b}");
            }
        }
    }

    #[test]
    fn piece_layout() {
        let pieces = scheme().split(PHRASE.as_bytes(), "root/s/mnemonic.txt").unwrap();
        let first: serde_json::Value =
            serde_json::from_slice(&pieces["one/root/s/mnemonic.txt"]).unwrap();
        assert_eq!("root/s/mnemonic.txt", first["path"]);
        assert_eq!("a", first["words"]["0"]);
        assert_eq!("h", first["words"]["7"]);
        assert!(first["words"].get("8").is_none());
    }

    #[test]
    fn malformed_phrases_are_rejected() {
        for bad in [
            "a b c",
            "a b c d e f g h i j k l m",
            "a  b c d e f g h i j k",
            " a b c d e f g h i j k l",
            "a b c d e f g h i j k l ",
            "a\tb c d e f g h i j k l m",
        ] {
            assert!(
                matches!(
                    scheme().split(bad.as_bytes(), "p"),
                    Err(SplitError::MalformedPhrase)
                ),
                "{bad:?}"
            );
        }
        assert!(scheme().split(&[0xff, 0xfe], "p").is_err());
    }

    #[test]
    fn one_piece_is_missing() {
        let mut pieces = scheme().split(PHRASE.as_bytes(), "p").unwrap();
        pieces.remove("one/p");
        pieces.remove("two/p");
        assert_eq!(
            Reconstruction::Missing("8 of 12 words present".into()),
            scheme().combine(&pieces, "p").unwrap()
        );
    }

    #[test]
    fn conflicting_word_is_inconsistent() {
        let pieces = scheme().split(PHRASE.as_bytes(), "p").unwrap();
        let other = scheme()
            .split("a b c d x f g h i j k l".as_bytes(), "p")
            .unwrap();
        let mut mixed = Pieces::new();
        mixed.insert("one/p".into(), pieces["one/p"].clone());
        mixed.insert("two/p".into(), other["two/p"].clone());
        assert_eq!(
            Reconstruction::Inconsistent("pieces disagree on word 4".into()),
            scheme().combine(&mixed, "p").unwrap()
        );
    }

    #[test]
    fn piece_for_another_path_is_inconsistent() {
        let pieces = scheme().split(PHRASE.as_bytes(), "p").unwrap();
        assert!(matches!(
            scheme().combine(&pieces, "q").unwrap(),
            Reconstruction::Inconsistent(_)
        ));
    }
}
