//! Logical paths of the values in the custody tree.

/// Zero padded child index, at least `width` digits.
pub fn pad(index: u32, width: usize) -> String {
    format!("{index:0width$}")
}

/// `<seed>/<purpose>/<ddd>/<ddd>/<dddddddd>`, the padded index split
/// into two directory levels so no directory grows past 1000 entries.
pub fn child_store_path(seed_id: &str, purpose_id: &str, index: u32) -> String {
    let padded = pad(index, 8);
    format!(
        "{seed_id}/{purpose_id}/{}/{}/{padded}",
        &padded[..3],
        &padded[3..6]
    )
}

/// Logical path of a seed's mnemonic.
pub fn mnemonic(seed_id: &str) -> String {
    format!("root/{seed_id}/mnemonic.txt")
}

/// Logical path of a seed.
pub fn seed(seed_id: &str) -> String {
    format!("root/{seed_id}/seed.txt")
}

/// Logical path of a purpose extended private key.
pub fn purpose_key(seed_id: &str, purpose_id: &str) -> String {
    format!("purpose/{seed_id}/{purpose_id}/private-extended-key.txt")
}

/// Logical path of a child private key.
pub fn child_private_key(store_path: &str) -> String {
    format!("address-private/{store_path}")
}

/// Logical path of a child address proof.
pub fn child_address(store_path: &str) -> String {
    format!("address/{store_path}.json")
}
