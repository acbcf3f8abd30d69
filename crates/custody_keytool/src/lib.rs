#![deny(missing_docs)]
#![deny(unsafe_code)]
//! Offline key custody tool.
//!
//! # Usage
//!
//! ```text
//! custody-keytool init       write a template config
//! custody-keytool generate   derive everything and store it
//! custody-keytool retrieve   reconstruct and cross check, never write
//! custody-keytool complete   retrieve, then store whatever is missing
//! ```
//!
//! For every configured seed the [runner::TaskRunner] walks the tree
//! mnemonic, seed, purpose extended key, then per child index the child
//! private key and its address proof. Each value is stored through
//! [custody_api::StorageManager] under its logical path:
//!
//! ```text
//! root/<seed>/mnemonic.txt
//! root/<seed>/seed.txt
//! purpose/<seed>/<purpose>/private-extended-key.txt
//! address-private/<seed>/<purpose>/<ddd>/<ddd>/<dddddddd>
//! address/<seed>/<purpose>/<ddd>/<ddd>/<dddddddd>.json
//! ```

/// Re-exported dependencies.
pub mod dependencies {
    pub use custody_api;
    pub use custody_api::dependencies::*;
    pub use tracing_subscriber;
}

mod error;
pub use error::*;

mod mode;
pub use mode::*;

pub mod paths;

pub mod derive;

mod bip32_provider;
pub use bip32_provider::*;

mod eth_signer;
pub use eth_signer::*;

pub mod runner;

/// Re-export module exports.
pub mod prelude {
    pub use crate::derive::*;
    pub use crate::error::*;
    pub use crate::mode::*;
    pub use crate::runner::*;
    pub use crate::{Bip32Provider, EthSigner};
    pub use custody_api::prelude::*;
}
