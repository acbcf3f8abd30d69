use crate::derive::KeyDerivation;
use crate::*;
use bip32::{ChildNumber, Prefix, XPrv};
use bip39::{Language, Mnemonic};
use custody_api::{PathStep, SecretBytes};
use rand::RngCore;
use zeroize::Zeroizing;

fn key_err(e: bip32::Error) -> DeriveError {
    DeriveError::Key(e.to_string())
}

fn mnemonic_err(e: bip39::Error) -> DeriveError {
    DeriveError::Mnemonic(e.to_string())
}

/// BIP-39 mnemonics and BIP-32 secp256k1 derivation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bip32Provider;

impl KeyDerivation for Bip32Provider {
    type Key = XPrv;

    fn generate_mnemonic(&self) -> DeriveResult<Zeroizing<String>> {
        // 128 bits of entropy give 12 words
        let mut entropy = Zeroizing::new([0u8; 16]);
        rand::rngs::OsRng.fill_bytes(&mut *entropy);
        let mnemonic =
            Mnemonic::from_entropy(&*entropy).map_err(mnemonic_err)?;
        Ok(Zeroizing::new(mnemonic.to_string()))
    }

    fn validate_mnemonic(&self, phrase: &str) -> bool {
        Mnemonic::parse_in(Language::English, phrase).is_ok()
    }

    fn mnemonic_to_seed(&self, phrase: &str) -> DeriveResult<SecretBytes> {
        let mnemonic = Mnemonic::parse_in(Language::English, phrase)
            .map_err(mnemonic_err)?;
        let seed = Zeroizing::new(mnemonic.to_seed(""));
        Ok(SecretBytes::new(seed.to_vec()))
    }

    fn master_from_seed(&self, seed: &[u8]) -> DeriveResult<XPrv> {
        XPrv::new(seed).map_err(key_err)
    }

    fn derive_path(
        &self,
        master: &XPrv,
        path: &[PathStep],
    ) -> DeriveResult<XPrv> {
        let mut key = master.clone();
        for step in path {
            let child =
                ChildNumber::new(step.index, step.hardened).map_err(key_err)?;
            key = key.derive_child(child).map_err(key_err)?;
        }
        Ok(key)
    }

    fn derive_child(
        &self,
        key: &XPrv,
        child_number: u32,
    ) -> DeriveResult<XPrv> {
        key.derive_child(ChildNumber(child_number)).map_err(key_err)
    }

    fn to_extended_private(
        &self,
        key: &XPrv,
    ) -> DeriveResult<Zeroizing<String>> {
        Ok(key.to_string(Prefix::XPRV))
    }

    fn from_extended_private(&self, text: &str) -> DeriveResult<XPrv> {
        text.trim().parse::<XPrv>().map_err(key_err)
    }

    fn private_key_bytes(&self, key: &XPrv) -> SecretBytes {
        let bytes = Zeroizing::new(key.to_bytes());
        SecretBytes::new(bytes.to_vec())
    }
}
