#![deny(missing_docs)]
#![deny(unsafe_code)]
//! Tamper-evident storage of split secrets.
//!
//! The [StorageManager] splits a secret with a [Scheme], writes each
//! piece below the production directory and records the length and
//! SHA3-512 digest of the content and of every piece in an
//! [IntegrityRecord] below the open directory. Retrieval reads the record
//! first, checks every piece against it, hands only the pieces that
//! match to the scheme, then checks the reconstructed content against
//! the record again.
//!
//! Every step of a retrieval can be reported to an [AuditLog].

/// Re-exported dependencies.
pub mod dependencies {
    pub use custody_split;
    pub use one_err;
    pub use serde;
    pub use serde_json;
    pub use serde_yaml;
    pub use tracing;
    pub use zeroize;
}

pub use custody_split::{
    Pieces, Reconstruction, Scheme, SecretBytes, SplitError, SplitResult,
};

mod error;
pub use error::*;

mod secret;
pub use secret::*;

mod record;
pub use record::*;

pub mod raw_store;
pub use raw_store::RawStore;

pub mod fs_store;

pub mod mem_store;

mod audit;
pub use audit::*;

mod manager;
pub use manager::*;

mod config;
pub use config::*;

/// Re-export module exports.
pub mod prelude {
    pub use crate::audit::*;
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::manager::*;
    pub use crate::raw_store::traits::*;
    pub use crate::raw_store::*;
    pub use crate::record::*;
    pub use crate::secret::*;
    pub use custody_split::{
        ClearScheme, Pieces, Reconstruction, Scheme, SecretBytes,
        ThresholdScheme, WordSplitScheme,
    };
}
