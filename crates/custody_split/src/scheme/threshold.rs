use super::combinations::Combinations;
use super::*;
use sharks::{Share, Sharks};
use zeroize::Zeroizing;

/// Shares are persisted as hex text of the sharks wire bytes
/// (x coordinate followed by the y bytes).
fn encode_share(share: &Share) -> SecretBytes {
    let raw = Zeroizing::new(Vec::from(share));
    SecretBytes::new(hex::encode(&*raw).into_bytes())
}

fn decode_share(text: &[u8]) -> Result<Share, String> {
    let raw = Zeroizing::new(
        hex::decode(text).map_err(|e| format!("share is not hex: {e}"))?,
    );
    Share::try_from(raw.as_slice()).map_err(|e| format!("bad share: {e}"))
}

/// Combine every `threshold`-subset of the shares and require them to
/// agree. Used both to self-check fresh shares and on retrieval.
fn combine_verify(texts: &[&[u8]], threshold: usize) -> Reconstruction {
    if texts.len() < threshold {
        return Reconstruction::Missing(format!(
            "{} of {} required shares present",
            texts.len(),
            threshold
        ));
    }

    let shares = match texts
        .iter()
        .map(|t| decode_share(t))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(shares) => shares,
        Err(reason) => return Reconstruction::Inconsistent(reason),
    };

    let sharks = Sharks(threshold as u8);

    let first = match sharks.recover(&shares[..threshold]) {
        Ok(secret) => Zeroizing::new(secret),
        Err(e) => return Reconstruction::Inconsistent(e.to_string()),
    };

    for combo in Combinations::new(shares.len(), threshold) {
        let subset: Vec<&Share> = combo.iter().map(|&i| &shares[i]).collect();
        let res = match sharks.recover(subset) {
            Ok(secret) => Zeroizing::new(secret),
            Err(e) => return Reconstruction::Inconsistent(e.to_string()),
        };
        if res != first {
            tracing::warn!(?combo, "share combinations disagree");
            return Reconstruction::Inconsistent(
                "combinations do not match".into(),
            );
        }
    }

    match hex::decode(&*first) {
        Ok(content) => Reconstruction::Ok(SecretBytes::new(content)),
        Err(_) => Reconstruction::Inconsistent(
            "recovered content is not hex encoded".into(),
        ),
    }
}

pub(crate) fn split(
    scheme: &ThresholdScheme,
    content: &[u8],
    logical_path: &str,
) -> SplitResult<Pieces> {
    // a share needs at least one secret byte after its x coordinate
    if content.is_empty() {
        return Err(SplitError::InvalidParameters {
            scheme: THRESHOLD_TAG,
            reason: format!("nothing to split for {logical_path}, content is empty"),
        });
    }
    let encoded = Zeroizing::new(hex::encode(content));
    let shares: Vec<SecretBytes> = Sharks(scheme.threshold)
        .dealer(encoded.as_bytes())
        .take(scheme.total_shares as usize)
        .map(|s| encode_share(&s))
        .collect();

    if shares.len() != scheme.total_shares as usize {
        return Err(SplitError::SelfCheck(logical_path.to_string()));
    }

    let texts: Vec<&[u8]> = shares.iter().map(|s| s.as_slice()).collect();
    match combine_verify(&texts, scheme.threshold as usize) {
        Reconstruction::Ok(check) if check.as_slice() == content => (),
        _ => return Err(SplitError::SelfCheck(logical_path.to_string())),
    }

    Ok(scheme
        .destinations
        .iter()
        .zip(shares)
        .map(|(dest, share)| (piece_path(dest, logical_path), share))
        .collect())
}

pub(crate) fn combine(scheme: &ThresholdScheme, pieces: &Pieces) -> Reconstruction {
    let texts: Vec<&[u8]> = pieces.values().map(|p| p.as_slice()).collect();
    combine_verify(&texts, scheme.threshold as usize)
}
