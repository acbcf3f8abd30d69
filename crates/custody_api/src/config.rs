use crate::*;
use custody_split::{ThresholdScheme, WordSplitScheme};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Hardened child offset.
pub const HARDENED_BIT: u32 = 0x8000_0000;

/// One step of a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// child index without the hardened bit
    pub index: u32,
    /// hardened derivation
    pub hardened: bool,
}

impl PathStep {
    /// The child number as used on the wire, hardened bit included.
    pub fn child_number(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_BIT
        } else {
            self.index
        }
    }
}

/// Parse a derivation path of the form `m/44'/60'/0'/0`.
///
/// At least one step is required, indices must be below 2^31.
pub fn parse_derivation_path(path: &str) -> Option<Vec<PathStep>> {
    let mut parts = path.split('/');
    if parts.next() != Some("m") {
        return None;
    }
    let mut out = Vec::new();
    for part in parts {
        let (digits, hardened) = match part.strip_suffix('\'') {
            Some(digits) => (digits, true),
            None => (part, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index: u32 = digits.parse().ok()?;
        if index >= HARDENED_BIT {
            return None;
        }
        out.push(PathStep { index, hardened });
    }
    if out.is_empty() {
        return None;
    }
    Some(out)
}

/// One derivation purpose of a seed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurposeConfig {
    /// derivation path of the purpose key, e.g. `m/44'/60'/0'/0`
    pub path: String,

    /// child indices `0..range` are derived below the purpose key
    pub range: u32,

    /// derive hardened children
    #[serde(default)]
    pub hardened: bool,

    /// scheme for the purpose extended private key
    pub private_key_extended_storage: Scheme,

    /// scheme for each child private key
    pub addr_private_key_storage: Scheme,

    /// scheme for each child address proof document
    pub addr_storage: Scheme,
}

/// One seed and everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedConfig {
    /// scheme for the mnemonic phrase
    pub mnemonic_storage: Scheme,

    /// scheme for the 64 byte seed
    pub seed_storage: Scheme,

    /// derivation purposes by id
    #[serde(default)]
    pub purposes: BTreeMap<String, PurposeConfig>,
}

/// Keytool configuration.
///
/// Loaded from yaml (or json, which is a yaml subset) with camelCase
/// keys. Relative directories are relative to the file they were read
/// from, see [KeyToolConfigInner::resolve_relative_to].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyToolConfigInner {
    /// root for secret pieces
    pub prod_dir: PathBuf,

    /// root for integrity records
    pub open_dir: PathBuf,

    /// if set, successfully retrieved secrets are exported here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieve_dir: Option<PathBuf>,

    /// if set, the audit log is written here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieve_log: Option<PathBuf>,

    /// seeds by id
    pub seeds: BTreeMap<String, SeedConfig>,
}

/// Keytool configuration.
pub type KeyToolConfig = Arc<KeyToolConfigInner>;

impl std::fmt::Display for KeyToolConfigInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_yaml::to_string(self).map_err(|_| std::fmt::Error)?;

        // inject some helpful comments
        let mut lines = Vec::new();
        for line in s.split('\n') {
            if line.starts_with("prodDir:") {
                lines.push("# Secret pieces are written below this directory.");
                lines.push("# Each scheme destination is a subdirectory, move");
                lines.push("# them to separate media after generation.");
            } else if line.starts_with("openDir:") {
                lines.push("");
                lines.push("# Integrity records, no secret material.");
            } else if line.starts_with("retrieveDir:") {
                lines.push("");
                lines.push("# Optional plaintext export of retrieved secrets.");
                lines.push("# Must not exist before a retrieve or complete run.");
            } else if line.starts_with("retrieveLog:") {
                lines.push("");
                lines.push("# Optional audit log, truncated on every run.");
            } else if line.starts_with("seeds:") {
                lines.push("");
                lines.push("# Seeds to generate or retrieve, by id.");
            }
            lines.push(line);
        }
        f.write_str(&lines.join("\n"))
    }
}

impl KeyToolConfigInner {
    /// Parse and validate a configuration.
    pub fn from_bytes(bytes: &[u8]) -> CustodyResult<Self> {
        let mut config: Self =
            serde_yaml::from_slice(bytes).map_err(one_err::OneErr::new)?;
        // an empty string means "not configured"
        if matches!(&config.retrieve_dir, Some(p) if p.as_os_str().is_empty()) {
            config.retrieve_dir = None;
        }
        if matches!(&config.retrieve_log, Some(p) if p.as_os_str().is_empty()) {
            config.retrieve_log = None;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check directories are set, every scheme is usable, purpose paths
    /// are well formed and unique within their seed and ranges fit in
    /// the child index space.
    pub fn validate(&self) -> CustodyResult<()> {
        if self.prod_dir.as_os_str().is_empty()
            || self.open_dir.as_os_str().is_empty()
        {
            return Err("prodDir and openDir must both be set".into());
        }
        let check_scheme = |owner: &str, scheme: &Scheme| {
            scheme
                .validate()
                .map_err(|e| one_err::OneErr::new(format!("{owner}: {e}")))
        };
        for (seed_id, seed) in self.seeds.iter() {
            check_scheme(seed_id.as_str(), &seed.mnemonic_storage)?;
            check_scheme(seed_id.as_str(), &seed.seed_storage)?;
            let mut seen = BTreeSet::new();
            for (purpose_id, purpose) in seed.purposes.iter() {
                let owner = format!("{seed_id}/{purpose_id}");
                check_scheme(owner.as_str(), &purpose.private_key_extended_storage)?;
                check_scheme(owner.as_str(), &purpose.addr_private_key_storage)?;
                check_scheme(owner.as_str(), &purpose.addr_storage)?;
                if parse_derivation_path(&purpose.path).is_none()
                    || !seen.insert(purpose.path.as_str())
                {
                    return Err(format!(
                        "derivation path for {seed_id}/{purpose_id} invalid or duplicate: {}",
                        purpose.path
                    )
                    .into());
                }
                if purpose.range > HARDENED_BIT {
                    return Err(format!(
                        "range of {seed_id}/{purpose_id} exceeds the {HARDENED_BIT} non-hardened child indices"
                    )
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Make every relative directory relative to `root`.
    pub fn resolve_relative_to(mut self, root: &Path) -> Self {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        fix(&mut self.prod_dir);
        fix(&mut self.open_dir);
        if let Some(p) = self.retrieve_dir.as_mut() {
            fix(p);
        }
        if let Some(p) = self.retrieve_log.as_mut() {
            fix(p);
        }
        self
    }

    /// A starting point configuration with one seed and one purpose.
    pub fn example() -> Self {
        let sites = |names: &[&str]| -> Vec<String> {
            names.iter().map(|n| n.to_string()).collect()
        };
        let two_of_three = Scheme::Threshold(ThresholdScheme {
            total_shares: 3,
            threshold: 2,
            destinations: sites(&["site-a", "site-b", "site-c"]),
        });
        let mut purposes = BTreeMap::new();
        purposes.insert(
            "eth".to_string(),
            PurposeConfig {
                path: "m/44'/60'/0'/0".to_string(),
                range: 10,
                hardened: false,
                private_key_extended_storage: two_of_three.clone(),
                addr_private_key_storage: two_of_three.clone(),
                addr_storage: Scheme::Clear(custody_split::ClearScheme {
                    base_path: "public".to_string(),
                }),
            },
        );
        let mut seeds = BTreeMap::new();
        seeds.insert(
            "main".to_string(),
            SeedConfig {
                mnemonic_storage: Scheme::WordSplit(WordSplitScheme {
                    destinations: sites(&["site-a", "site-b", "site-c"]),
                }),
                seed_storage: two_of_three,
                purposes,
            },
        );
        Self {
            prod_dir: "product".into(),
            open_dir: "open".into(),
            retrieve_dir: Some("retrieved".into()),
            retrieve_log: Some("retrieve.log".into()),
            seeds,
        }
    }
}
