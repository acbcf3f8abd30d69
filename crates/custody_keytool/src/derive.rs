//! Seams to the key derivation and signature math.

use crate::*;
use custody_api::{PathStep, SecretBytes};
use zeroize::Zeroizing;

/// Hierarchical deterministic key derivation.
pub trait KeyDerivation {
    /// Extended private key handle.
    type Key: Clone;

    /// A fresh 12 word mnemonic.
    fn generate_mnemonic(&self) -> DeriveResult<Zeroizing<String>>;

    /// True if the phrase is a valid mnemonic (wordlist and checksum).
    fn validate_mnemonic(&self, phrase: &str) -> bool;

    /// Seed of a mnemonic with an empty passphrase.
    fn mnemonic_to_seed(&self, phrase: &str) -> DeriveResult<SecretBytes>;

    /// Master key of a seed.
    fn master_from_seed(&self, seed: &[u8]) -> DeriveResult<Self::Key>;

    /// Derive along a parsed path below `master`.
    fn derive_path(
        &self,
        master: &Self::Key,
        path: &[PathStep],
    ) -> DeriveResult<Self::Key>;

    /// Derive one child, `child_number` includes the hardened bit.
    fn derive_child(
        &self,
        key: &Self::Key,
        child_number: u32,
    ) -> DeriveResult<Self::Key>;

    /// Serialize as an extended private key string.
    fn to_extended_private(
        &self,
        key: &Self::Key,
    ) -> DeriveResult<Zeroizing<String>>;

    /// Parse an extended private key string.
    fn from_extended_private(&self, text: &str) -> DeriveResult<Self::Key>;

    /// The raw private key.
    fn private_key_bytes(&self, key: &Self::Key) -> SecretBytes;
}

/// Addresses and message signatures for raw private keys.
pub trait AddressSigner {
    /// Checksummed address of a private key.
    fn address(&self, private_key: &[u8]) -> DeriveResult<String>;

    /// `0x` prefixed r, s, v signature over the message digest.
    fn sign_message(
        &self,
        private_key: &[u8],
        message: &str,
    ) -> DeriveResult<String>;

    /// Address of whoever produced `signature` over `message`.
    fn recover_address(
        &self,
        message: &str,
        signature: &str,
    ) -> DeriveResult<String>;
}

/// Public proof that the holder of a child key controls an address.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddressProof {
    /// full derivation path of the child
    pub path: String,
    /// child number, hardened bit included
    pub index: u32,
    /// checksummed address
    pub address: String,
    /// `sign by <address>`
    pub message: String,
    /// signature over the message by the child key
    pub signature: String,
}

impl AddressProof {
    /// Build and sign the proof for one child key.
    pub fn sign<S: AddressSigner>(
        signer: &S,
        private_key: &[u8],
        path: String,
        index: u32,
    ) -> DeriveResult<Self> {
        let address = signer.address(private_key)?;
        let message = format!("sign by {address}");
        let signature = signer.sign_message(private_key, &message)?;
        Ok(Self {
            path,
            index,
            address,
            message,
            signature,
        })
    }

    /// True if the signature recovers to the stated address.
    pub fn verify<S: AddressSigner>(&self, signer: &S) -> DeriveResult<bool> {
        let recovered = signer.recover_address(&self.message, &self.signature)?;
        Ok(recovered.to_lowercase() == self.address.to_lowercase())
    }
}
