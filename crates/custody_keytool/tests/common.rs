#![allow(dead_code)]

use custody_keytool::dependencies::*;
use custody_keytool::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub fn init_tracing() {
    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .finish(),
    );
}

fn sites() -> Vec<String> {
    vec!["site-a".into(), "site-b".into(), "site-c".into()]
}

fn two_of_three() -> Scheme {
    Scheme::Threshold(ThresholdScheme {
        total_shares: 3,
        threshold: 2,
        destinations: sites(),
    })
}

/// One seed `s1` with purposes `btc` (1 hardened child) and
/// `eth` (2 children), 10 stored values in total.
pub fn test_config(
    prod_dir: impl Into<PathBuf>,
    open_dir: impl Into<PathBuf>,
) -> KeyToolConfigInner {
    let mut purposes = BTreeMap::new();
    purposes.insert(
        "btc".to_string(),
        PurposeConfig {
            path: "m/44'/0'/0'".into(),
            range: 1,
            hardened: true,
            private_key_extended_storage: two_of_three(),
            addr_private_key_storage: Scheme::Clear(ClearScheme {
                base_path: "site-a".into(),
            }),
            addr_storage: Scheme::Clear(ClearScheme {
                base_path: "public".into(),
            }),
        },
    );
    purposes.insert(
        "eth".to_string(),
        PurposeConfig {
            path: "m/44'/60'/0'/0".into(),
            range: 2,
            hardened: false,
            private_key_extended_storage: two_of_three(),
            addr_private_key_storage: two_of_three(),
            addr_storage: Scheme::Clear(ClearScheme {
                base_path: "public".into(),
            }),
        },
    );
    let mut seeds = BTreeMap::new();
    seeds.insert(
        "s1".to_string(),
        SeedConfig {
            mnemonic_storage: Scheme::WordSplit(WordSplitScheme {
                destinations: sites(),
            }),
            seed_storage: two_of_three(),
            purposes,
        },
    );
    KeyToolConfigInner {
        prod_dir: prod_dir.into(),
        open_dir: open_dir.into(),
        retrieve_dir: None,
        retrieve_log: None,
        seeds,
    }
}

/// Total values stored by a full generate of [test_config].
pub const TEST_CONFIG_VALUES: usize = 10;
