//! Walks the custody tree and decides, per value, whether to derive,
//! retrieve, cross check or backfill.

use crate::derive::*;
use crate::paths;
use crate::*;
use custody_api::*;

/// Counters of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// values written
    pub saved: usize,
    /// values successfully retrieved
    pub retrieved: usize,
    /// checks that passed
    pub verified: usize,
    /// checks that could not be performed
    pub skipped: usize,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "saved {} retrieved {} verified {} skipped {}",
            self.saved, self.retrieved, self.verified, self.skipped
        )
    }
}

struct Walk<'a> {
    audit: &'a mut AuditLog,
    report: RunReport,
}

impl Walk<'_> {
    fn passed(
        &mut self,
        category: AuditCategory,
        path: impl Into<String>,
    ) -> RunResult<()> {
        self.audit.record(category, path, AuditStatus::Ok)?;
        self.report.verified += 1;
        Ok(())
    }

    fn skipped(
        &mut self,
        category: AuditCategory,
        path: impl Into<String>,
    ) -> RunResult<()> {
        self.audit.record(category, path, AuditStatus::Skipped)?;
        self.report.skipped += 1;
        Ok(())
    }
}

struct Purpose<'p, K> {
    seed_id: &'p str,
    purpose_id: &'p str,
    config: &'p PurposeConfig,
    steps: Vec<PathStep>,
    master: Option<&'p K>,
    key: Option<K>,
}

/// Runs one mode over every configured seed.
pub struct TaskRunner<D = Bip32Provider, S = EthSigner> {
    config: KeyToolConfig,
    mode: Mode,
    storage: StorageManager,
    deriver: D,
    signer: S,
}

impl TaskRunner {
    /// Runner with the BIP-32 and Ethereum providers.
    pub fn new(
        config: KeyToolConfig,
        mode: Mode,
        store: RawStore,
    ) -> RunResult<Self> {
        Self::with_providers(config, mode, store, Bip32Provider, EthSigner)
    }
}

impl<D: KeyDerivation, S: AddressSigner> TaskRunner<D, S> {
    /// Runner with explicit providers.
    ///
    /// Fails unless the directories are in the state the mode needs:
    /// generate requires the product and open roots to be absent,
    /// retrieve and complete require both to exist and a configured
    /// export directory to be absent.
    pub fn with_providers(
        config: KeyToolConfig,
        mode: Mode,
        store: RawStore,
        deriver: D,
        signer: S,
    ) -> RunResult<Self> {
        config
            .validate()
            .map_err(|e| RunError::Precondition(e.to_string()))?;

        if mode.retrieves() {
            if !(store.exists(&config.open_dir) && store.exists(&config.prod_dir))
            {
                return Err(RunError::Precondition(format!(
                    "product {:?} or open {:?} path does not exist",
                    config.prod_dir, config.open_dir
                )));
            }
            if let Some(dir) = &config.retrieve_dir {
                if store.exists(dir) {
                    return Err(RunError::Precondition(format!(
                        "retrieve dir {dir:?} already exists and this tool does not overwrite"
                    )));
                }
            }
        } else if store.exists(&config.open_dir) || store.exists(&config.prod_dir)
        {
            return Err(RunError::Precondition(format!(
                "destination path {:?} or {:?} exists and this tool would not overwrite",
                config.prod_dir, config.open_dir
            )));
        }

        let storage = StorageManager::from_config(store, &config);
        Ok(Self {
            config,
            mode,
            storage,
            deriver,
            signer,
        })
    }

    /// The mode this runner was built for.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Walk every seed, writing the audit log to the configured
    /// `retrieveLog` if there is one.
    pub fn run(&self) -> RunResult<RunReport> {
        let mut audit = match &self.config.retrieve_log {
            Some(path) => AuditLog::create(path)?,
            None => AuditLog::in_memory(),
        };
        let report = self.run_with_audit(&mut audit)?;
        audit.close()?;
        Ok(report)
    }

    /// Walk every seed, recording into the given audit log.
    ///
    /// Stops at the first fatal error, nothing below the failing value
    /// is visited.
    pub fn run_with_audit(&self, audit: &mut AuditLog) -> RunResult<RunReport> {
        tracing::info!(
            mode = %self.mode,
            seeds = self.config.seeds.len(),
            "run starting"
        );
        let mut walk = Walk {
            audit,
            report: RunReport::default(),
        };
        for (seed_id, seed_config) in self.config.seeds.iter() {
            self.walk_seed(&mut walk, seed_id, seed_config)?;
        }
        tracing::info!(report = %walk.report, "run complete");
        Ok(walk.report)
    }

    /// Retrieve and cross check one value, then backfill it if the mode
    /// allows. The derived value wins over the retrieved one.
    fn resolve(
        &self,
        walk: &mut Walk<'_>,
        derived: Option<Secret>,
        logical_path: &str,
        scheme: &Scheme,
    ) -> RunResult<Option<Secret>> {
        let (status, retrieved) = if self.mode.retrieves() {
            let retrieval = self.storage.retrieve(
                logical_path,
                scheme,
                Some(&mut *walk.audit),
            )?;
            (Some(retrieval.status), retrieval.content)
        } else {
            (None, None)
        };
        if retrieved.is_some() {
            walk.report.retrieved += 1;
        }

        match (&derived, &retrieved) {
            (Some(d), Some(r)) => {
                if d != r {
                    return Err(RunError::DerivedMismatch(logical_path.into()));
                }
                walk.passed(AuditCategory::DerivedRetrieved, logical_path)?;
            }
            _ => walk.skipped(AuditCategory::DerivedRetrieved, logical_path)?,
        }

        if let (Some(d), None, true) =
            (&derived, &retrieved, self.mode.backfills())
        {
            if let Some(ContentStatus::Inconsistent(_) | ContentStatus::Mismatch) =
                &status
            {
                tracing::warn!(
                    logical_path,
                    "replacing inconsistent stored value with derived value"
                );
            }
            walk.audit
                .record(AuditCategory::Content, logical_path, AuditStatus::Saved)?;
            self.storage.store(d, logical_path, scheme)?;
            walk.report.saved += 1;
            tracing::info!(logical_path, "saved");
        }

        tracing::debug!(logical_path, "resolved");
        Ok(derived.or(retrieved))
    }

    fn walk_seed(
        &self,
        walk: &mut Walk<'_>,
        seed_id: &str,
        seed_config: &SeedConfig,
    ) -> RunResult<()> {
        let mnemonic_path = paths::mnemonic(seed_id);
        let derived = match self.mode {
            Mode::Generate => {
                Some(Secret::Text(self.deriver.generate_mnemonic()?))
            }
            _ => None,
        };
        let mnemonic = self.resolve(
            walk,
            derived,
            &mnemonic_path,
            &seed_config.mnemonic_storage,
        )?;
        let phrase = match &mnemonic {
            None => None,
            Some(secret) => match secret.as_text() {
                Some(text) if self.deriver.validate_mnemonic(text) => Some(text),
                _ => {
                    return Err(RunError::Malformed {
                        path: mnemonic_path,
                        expected: "mnemonic",
                    })
                }
            },
        };

        let derived = phrase
            .map(|p| self.deriver.mnemonic_to_seed(p))
            .transpose()?
            .map(Secret::Bytes);
        let seed = self.resolve(
            walk,
            derived,
            &paths::seed(seed_id),
            &seed_config.seed_storage,
        )?;

        let check = format!("{seed_id}#[mnemonic,seed]");
        match (phrase, &seed) {
            (Some(phrase), Some(seed)) => {
                let expect = self.deriver.mnemonic_to_seed(phrase)?;
                if expect.as_slice() != seed.as_bytes() {
                    return Err(RunError::Verify {
                        check: "mnemonic,seed",
                        path: seed_id.to_string(),
                    });
                }
                walk.passed(AuditCategory::Verify, check)?;
            }
            _ => walk.skipped(AuditCategory::Verify, check)?,
        }

        let master = seed
            .as_ref()
            .map(|s| self.deriver.master_from_seed(s.as_bytes()))
            .transpose()?;

        for (purpose_id, purpose_config) in seed_config.purposes.iter() {
            let steps = parse_derivation_path(&purpose_config.path).ok_or_else(
                || RunError::Malformed {
                    path: format!("{seed_id}/{purpose_id}"),
                    expected: "derivation path",
                },
            )?;
            let mut purpose = Purpose {
                seed_id,
                purpose_id,
                config: purpose_config,
                steps,
                master: master.as_ref(),
                key: None,
            };
            self.walk_purpose(walk, &mut purpose)?;
        }
        Ok(())
    }

    fn walk_purpose(
        &self,
        walk: &mut Walk<'_>,
        purpose: &mut Purpose<'_, D::Key>,
    ) -> RunResult<()> {
        let key_path = paths::purpose_key(purpose.seed_id, purpose.purpose_id);
        let derived_key = purpose
            .master
            .map(|m| self.deriver.derive_path(m, &purpose.steps))
            .transpose()?;
        let derived = derived_key
            .as_ref()
            .map(|k| self.deriver.to_extended_private(k))
            .transpose()?
            .map(Secret::Text);
        let xprv = self.resolve(
            walk,
            derived,
            &key_path,
            &purpose.config.private_key_extended_storage,
        )?;

        // restore the purpose key from storage if it could not be derived
        purpose.key = match (derived_key, &xprv) {
            (Some(key), _) => Some(key),
            (None, Some(secret)) => {
                let malformed = || RunError::Malformed {
                    path: key_path.clone(),
                    expected: "extended private key",
                };
                let text = secret.as_text().ok_or_else(malformed)?;
                Some(
                    self.deriver
                        .from_extended_private(text)
                        .map_err(|_| malformed())?,
                )
            }
            (None, None) => None,
        };

        for index in 0..purpose.config.range {
            self.walk_child(walk, purpose, index)?;
        }
        Ok(())
    }

    fn walk_child(
        &self,
        walk: &mut Walk<'_>,
        purpose: &Purpose<'_, D::Key>,
        index: u32,
    ) -> RunResult<()> {
        let store_path =
            paths::child_store_path(purpose.seed_id, purpose.purpose_id, index);
        let step = PathStep {
            index,
            hardened: purpose.config.hardened,
        };
        let child_number = step.child_number();
        let child_path = format!(
            "{}/{}{}",
            purpose.config.path,
            index,
            if step.hardened { "'" } else { "" }
        );

        let key_child = purpose
            .key
            .as_ref()
            .map(|k| self.deriver.derive_child(k, child_number))
            .transpose()?;
        let key_from_path = purpose
            .master
            .map(|m| {
                let mut full = purpose.steps.clone();
                full.push(step);
                self.deriver.derive_path(m, &full)
            })
            .transpose()?;
        let check = format!("{store_path}#[deriveChild-derivePath]");
        match (&key_child, &key_from_path) {
            (Some(a), Some(b)) => {
                if self.deriver.private_key_bytes(a)
                    != self.deriver.private_key_bytes(b)
                {
                    return Err(RunError::Verify {
                        check: "deriveChild-derivePath",
                        path: store_path,
                    });
                }
                walk.passed(AuditCategory::Verify, check)?;
            }
            _ => walk.skipped(AuditCategory::Verify, check)?,
        }

        let private_path = paths::child_private_key(&store_path);
        let derived = key_child
            .as_ref()
            .map(|k| Secret::Bytes(self.deriver.private_key_bytes(k)));
        let child_private = self.resolve(
            walk,
            derived,
            &private_path,
            &purpose.config.addr_private_key_storage,
        )?;
        let child_key = match &child_private {
            Some(Secret::Bytes(bytes)) if bytes.len() == 32 => {
                Some(bytes.as_slice())
            }
            Some(_) => {
                return Err(RunError::Malformed {
                    path: private_path,
                    expected: "32 byte private key",
                })
            }
            None => None,
        };

        let derived = match child_key {
            Some(key) => {
                let proof = AddressProof::sign(
                    &self.signer,
                    key,
                    child_path,
                    child_number,
                )?;
                let json = serde_json::to_string_pretty(&proof)
                    .map_err(RunError::other)?;
                Some(Secret::text(json))
            }
            None => None,
        };
        let address_path = paths::child_address(&store_path);
        let document = self.resolve(
            walk,
            derived,
            &address_path,
            &purpose.config.addr_storage,
        )?;

        if let Some(document) = document {
            let proof: AddressProof = document
                .as_text()
                .and_then(|text| serde_json::from_str(text).ok())
                .ok_or_else(|| RunError::Malformed {
                    path: address_path.clone(),
                    expected: "address proof",
                })?;
            if !proof.verify(&self.signer)? {
                return Err(RunError::Verify {
                    check: "address-message-signature",
                    path: store_path,
                });
            }
            walk.passed(
                AuditCategory::Verify,
                format!("{store_path}#[address-message-signature]"),
            )?;

            if let Some(key) = child_key {
                if self.signer.address(key)? != proof.address {
                    return Err(RunError::Verify {
                        check: "private-key-address",
                        path: store_path,
                    });
                }
                walk.passed(
                    AuditCategory::Verify,
                    format!("{store_path}#[private-key-address]"),
                )?;
            }
        }
        Ok(())
    }
}
