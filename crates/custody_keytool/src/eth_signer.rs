use crate::derive::AddressSigner;
use crate::*;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

fn sig_err(e: impl std::fmt::Display) -> DeriveError {
    DeriveError::Signature(e.to_string())
}

/// Compute Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Mixed case checksum encoding of a 20 byte address.
pub fn to_checksum_address(raw: &[u8]) -> String {
    let lower = hex::encode(raw);
    let hash = keccak256(lower.as_bytes());
    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn address_of(key: &VerifyingKey) -> String {
    // uncompressed sec1 point, skip the 0x04 tag
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    to_checksum_address(&hash[12..])
}

/// Ethereum style addresses and recoverable secp256k1 signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct EthSigner;

impl AddressSigner for EthSigner {
    fn address(&self, private_key: &[u8]) -> DeriveResult<String> {
        let key = SigningKey::from_slice(private_key).map_err(sig_err)?;
        Ok(address_of(key.verifying_key()))
    }

    fn sign_message(
        &self,
        private_key: &[u8],
        message: &str,
    ) -> DeriveResult<String> {
        let key = SigningKey::from_slice(private_key).map_err(sig_err)?;
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(&keccak256(message.as_bytes()))
            .map_err(sig_err)?;
        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&signature.to_bytes());
        out.push(27 + recovery_id.to_byte());
        Ok(format!("0x{}", hex::encode(out)))
    }

    fn recover_address(
        &self,
        message: &str,
        signature: &str,
    ) -> DeriveResult<String> {
        let raw = hex::decode(signature.strip_prefix("0x").unwrap_or(signature))
            .map_err(sig_err)?;
        if raw.len() != 65 {
            return Err(sig_err(format!(
                "expected 65 signature bytes, got {}",
                raw.len()
            )));
        }
        let v = raw[64];
        let recovery_id =
            RecoveryId::try_from(if v >= 27 { v - 27 } else { v })
                .map_err(sig_err)?;
        let signature = Signature::try_from(&raw[..64]).map_err(sig_err)?;
        let key = VerifyingKey::recover_from_prehash(
            &keccak256(message.as_bytes()),
            &signature,
            recovery_id,
        )
        .map_err(sig_err)?;
        Ok(address_of(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn checksum_vector() {
        let raw = hex::decode("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            to_checksum_address(&raw)
        );
    }

    #[test]
    fn address_of_key_one() {
        let mut key = [0u8; 32];
        key[31] = 1;
        assert_eq!(
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
            EthSigner.address(&key).unwrap()
        );
    }

    #[test]
    fn sign_then_recover() {
        let key = hex::decode(
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        let address = EthSigner.address(&key).unwrap();
        assert_eq!("0x2c7536E3605D9C16a7a3D7b1898e529396a65c23", address);

        let message = format!("sign by {address}");
        let signature = EthSigner.sign_message(&key, &message).unwrap();
        assert_eq!(132, signature.len());
        assert!(signature.ends_with("1b") || signature.ends_with("1c"));
        // deterministic nonces
        assert_eq!(signature, EthSigner.sign_message(&key, &message).unwrap());
        assert_eq!(
            address,
            EthSigner.recover_address(&message, &signature).unwrap()
        );
        assert_ne!(
            address,
            EthSigner.recover_address("sign by someone else", &signature).unwrap()
        );
    }

    #[test]
    fn malformed_signatures_fail() {
        assert!(EthSigner.recover_address("m", "0x1234").is_err());
        assert!(EthSigner.recover_address("m", "not hex").is_err());
    }
}
