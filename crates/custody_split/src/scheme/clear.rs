use super::*;

pub(crate) fn split(
    scheme: &ClearScheme,
    content: &[u8],
    logical_path: &str,
) -> Pieces {
    let mut out = Pieces::new();
    out.insert(
        piece_path(&scheme.base_path, logical_path),
        SecretBytes::new(content.to_vec()),
    );
    out
}

pub(crate) fn combine(
    pieces: &Pieces,
    logical_path: &str,
) -> SplitResult<Reconstruction> {
    let mut iter = pieces.values();
    match (iter.next(), iter.next()) {
        (None, _) => Ok(Reconstruction::Missing("no piece present".into())),
        (Some(piece), None) => Ok(Reconstruction::Ok(piece.clone())),
        (Some(_), Some(_)) => Err(SplitError::UnexpectedPieceCount {
            scheme: CLEAR_TAG,
            path: logical_path.to_string(),
            count: pieces.len(),
            max: 1,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme() -> Scheme {
        Scheme::Clear(ClearScheme {
            base_path: "clear".into(),
        })
    }

    #[test]
    fn single_piece_is_the_content() {
        let pieces = scheme().split(b"hello", "root/s/seed.txt").unwrap();
        assert_eq!(1, pieces.len());
        assert_eq!(b"hello".to_vec(), *pieces["clear/root/s/seed.txt"]);
        assert_eq!(
            Some(&b"hello"[..]),
            scheme()
                .combine(&pieces, "root/s/seed.txt")
                .unwrap()
                .content()
        );
    }

    #[test]
    fn no_piece_is_missing() {
        let out = scheme().combine(&Pieces::new(), "x").unwrap();
        assert!(matches!(out, Reconstruction::Missing(_)));
    }

    #[test]
    fn two_pieces_is_a_configuration_error() {
        let mut pieces = Pieces::new();
        pieces.insert("a/x".into(), SecretBytes::new(b"1".to_vec()));
        pieces.insert("b/x".into(), SecretBytes::new(b"1".to_vec()));
        assert!(matches!(
            scheme().combine(&pieces, "x"),
            Err(SplitError::UnexpectedPieceCount { count: 2, .. })
        ));
    }
}
