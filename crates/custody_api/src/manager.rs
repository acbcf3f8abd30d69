use crate::raw_store::confined_join;
use crate::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// State of one stored piece relative to its integrity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceStatus {
    /// present with the recorded length and digest
    Ok,
    /// present but altered
    Mismatch,
    /// absent
    Missing,
}

impl From<PieceStatus> for AuditStatus {
    fn from(s: PieceStatus) -> Self {
        match s {
            PieceStatus::Ok => AuditStatus::Ok,
            PieceStatus::Mismatch => AuditStatus::Mismatch,
            PieceStatus::Missing => AuditStatus::Missing,
        }
    }
}

/// State of a reconstructed secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStatus {
    /// reconstructed and matching the record
    Ok,
    /// there is no integrity record for this logical path
    RecordMissing,
    /// not enough intact pieces
    Missing(String),
    /// the intact pieces disagree
    Inconsistent(String),
    /// reconstructed content does not match the record
    Mismatch,
}

impl From<&ContentStatus> for AuditStatus {
    fn from(s: &ContentStatus) -> Self {
        match s {
            ContentStatus::Ok => AuditStatus::Ok,
            ContentStatus::RecordMissing | ContentStatus::Missing(_) => {
                AuditStatus::Missing
            }
            ContentStatus::Inconsistent(d) => {
                AuditStatus::Inconsistent(d.clone())
            }
            ContentStatus::Mismatch => AuditStatus::Mismatch,
        }
    }
}

/// Everything learned while retrieving one logical path.
#[derive(Debug)]
pub struct Retrieval {
    /// outcome for the content as a whole
    pub status: ContentStatus,

    /// outcome per recorded piece, keyed by storage path
    pub pieces: BTreeMap<String, PieceStatus>,

    /// the secret, only set when `status` is [ContentStatus::Ok]
    pub content: Option<Secret>,
}

impl Retrieval {
    fn record_missing() -> Self {
        Self {
            status: ContentStatus::RecordMissing,
            pieces: BTreeMap::new(),
            content: None,
        }
    }
}

/// Stores secrets as pieces plus an integrity record, and retrieves
/// them again with every piece checked.
#[derive(Clone)]
pub struct StorageManager {
    store: RawStore,
    prod_dir: PathBuf,
    open_dir: PathBuf,
    retrieve_dir: Option<PathBuf>,
}

impl std::fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageManager")
            .field("prod_dir", &self.prod_dir)
            .field("open_dir", &self.open_dir)
            .field("retrieve_dir", &self.retrieve_dir)
            .finish()
    }
}

impl StorageManager {
    /// Construct a manager over the given roots.
    pub fn new(
        store: RawStore,
        prod_dir: impl Into<PathBuf>,
        open_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            prod_dir: prod_dir.into(),
            open_dir: open_dir.into(),
            retrieve_dir: None,
        }
    }

    /// Also export every successfully retrieved secret below this dir.
    pub fn with_retrieve_dir(mut self, retrieve_dir: Option<PathBuf>) -> Self {
        self.retrieve_dir = retrieve_dir;
        self
    }

    /// Construct a manager from a loaded configuration.
    pub fn from_config(store: RawStore, config: &KeyToolConfigInner) -> Self {
        Self::new(store, &config.prod_dir, &config.open_dir)
            .with_retrieve_dir(config.retrieve_dir.clone())
    }

    /// Root below which pieces are written.
    pub fn prod_dir(&self) -> &Path {
        &self.prod_dir
    }

    /// Root below which integrity records are written.
    pub fn open_dir(&self) -> &Path {
        &self.open_dir
    }

    /// Export root, if any.
    pub fn retrieve_dir(&self) -> Option<&Path> {
        self.retrieve_dir.as_deref()
    }

    /// The storage backend.
    pub fn raw_store(&self) -> &RawStore {
        &self.store
    }

    /// Location of the integrity record for a logical path.
    pub fn record_path(&self, logical_path: &str) -> StoreResult<PathBuf> {
        confined_join(&self.open_dir, &format!("{logical_path}.json"))
    }

    /// Load the integrity record for a logical path, if there is one.
    pub fn load_record(
        &self,
        logical_path: &str,
    ) -> StoreResult<Option<IntegrityRecord>> {
        let path = self.record_path(logical_path)?;
        let bytes = match self.store.read(&path)? {
            None => return Ok(None),
            Some(bytes) => bytes,
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::CorruptRecord {
                path,
                reason: e.to_string(),
            })
    }

    /// Split a secret, write its pieces and then its integrity record.
    ///
    /// Every target path is resolved before anything is written, so an
    /// unsafe path leaves the store untouched.
    pub fn store(
        &self,
        secret: &Secret,
        logical_path: &str,
        scheme: &Scheme,
    ) -> StoreResult<IntegrityRecord> {
        let record_path = self.record_path(logical_path)?;
        let pieces = scheme.split(secret.as_bytes(), logical_path)?;
        let targets = pieces
            .iter()
            .map(|(path, bytes)| {
                Ok((confined_join(&self.prod_dir, path)?, bytes))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let record = IntegrityRecord::new(secret, &pieces);
        let record_json = record.to_json()?;

        for (target, bytes) in targets {
            self.store.write(&target, bytes)?;
        }
        self.store.write(&record_path, &record_json)?;

        tracing::debug!(
            logical_path,
            scheme = scheme.name(),
            pieces = pieces.len(),
            "stored"
        );
        Ok(record)
    }

    /// Load the record, check every piece, reconstruct from the intact
    /// pieces and check the result.
    ///
    /// Missing, altered or inconsistent data is reported through the
    /// returned [Retrieval]; only storage failures are errors.
    pub fn retrieve(
        &self,
        logical_path: &str,
        scheme: &Scheme,
        audit: Option<&mut AuditLog>,
    ) -> StoreResult<Retrieval> {
        let record = match self.load_record(logical_path)? {
            Some(record) => record,
            None => {
                tracing::debug!(logical_path, "no integrity record");
                if let Some(audit) = audit {
                    audit.record(
                        AuditCategory::Open,
                        logical_path,
                        AuditStatus::Missing,
                    )?;
                }
                return Ok(Retrieval::record_missing());
            }
        };

        let mut intact = Pieces::new();
        let mut pieces = BTreeMap::new();
        for (piece_path, expect) in record.storage_pieces.iter() {
            let target = confined_join(&self.prod_dir, piece_path)?;
            let status = match self.store.read(&target)? {
                None => PieceStatus::Missing,
                Some(bytes) if expect.matches(&bytes) => {
                    intact.insert(piece_path.clone(), bytes);
                    PieceStatus::Ok
                }
                Some(_) => {
                    tracing::warn!(%piece_path, "piece does not match its record");
                    PieceStatus::Mismatch
                }
            };
            pieces.insert(piece_path.clone(), status);
        }

        let (status, content) =
            match Self::reconstruct(&record, scheme, &intact, logical_path) {
                Ok(outcome) => outcome,
                Err(e) => {
                    // keep the piece checks on record before giving up
                    if let Some(audit) = audit {
                        Self::audit_pieces(audit, &pieces)?;
                    }
                    return Err(e);
                }
            };

        tracing::debug!(logical_path, ?status, "retrieved");

        if let Some(audit) = audit {
            audit.record(AuditCategory::Content, logical_path, (&status).into())?;
            Self::audit_pieces(audit, &pieces)?;
        }

        if let (Some(dir), Some(secret)) = (&self.retrieve_dir, &content) {
            let target = confined_join(dir, logical_path)?;
            self.store.write(&target, secret.as_bytes())?;
        }

        Ok(Retrieval {
            status,
            pieces,
            content,
        })
    }

    fn audit_pieces(
        audit: &mut AuditLog,
        pieces: &BTreeMap<String, PieceStatus>,
    ) -> StoreResult<()> {
        for (piece_path, piece_status) in pieces.iter() {
            audit.record(
                AuditCategory::Piece,
                piece_path.clone(),
                (*piece_status).into(),
            )?;
        }
        Ok(())
    }

    /// Combine the intact pieces and check the result against the record.
    fn reconstruct(
        record: &IntegrityRecord,
        scheme: &Scheme,
        intact: &Pieces,
        logical_path: &str,
    ) -> StoreResult<(ContentStatus, Option<Secret>)> {
        Ok(match scheme.combine(intact, logical_path)? {
            Reconstruction::Ok(bytes) => {
                if record.matches_content(&bytes) {
                    (
                        ContentStatus::Ok,
                        Some(Secret::from_content(record.r#type, bytes)?),
                    )
                } else {
                    tracing::warn!(
                        logical_path,
                        "reconstructed content does not match its record"
                    );
                    (ContentStatus::Mismatch, None)
                }
            }
            Reconstruction::Missing(detail) => {
                (ContentStatus::Missing(detail), None)
            }
            Reconstruction::Inconsistent(detail) => {
                tracing::warn!(logical_path, %detail, "pieces are inconsistent");
                (ContentStatus::Inconsistent(detail), None)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem_store::create_mem_store;
    use custody_split::{ClearScheme, ThresholdScheme};
    use pretty_assertions::assert_eq;

    fn clear() -> Scheme {
        Scheme::Clear(ClearScheme {
            base_path: "clear".into(),
        })
    }

    #[test]
    fn store_then_retrieve_clear() {
        let (store, mem) = create_mem_store();
        let mgr = StorageManager::new(store, "/prod", "/open");
        mgr.store(&Secret::text("hello"), "a/b.txt", &clear()).unwrap();
        assert_eq!(
            vec![
                PathBuf::from("/open/a/b.txt.json"),
                PathBuf::from("/prod/clear/a/b.txt")
            ],
            mem.files()
        );
        let got = mgr.retrieve("a/b.txt", &clear(), None).unwrap();
        assert_eq!(ContentStatus::Ok, got.status);
        assert_eq!(Some(Secret::text("hello")), got.content);
    }

    #[test]
    fn byte_content_comes_back_as_bytes() {
        let (store, _mem) = create_mem_store();
        let mgr = StorageManager::new(store, "/prod", "/open");
        mgr.store(&Secret::bytes(vec![0, 1, 2, 255]), "s", &clear())
            .unwrap();
        let got = mgr.retrieve("s", &clear(), None).unwrap();
        assert_eq!(Some(Secret::bytes(vec![0, 1, 2, 255])), got.content);
    }

    #[test]
    fn absent_record_is_reported_once() {
        let (store, _mem) = create_mem_store();
        let mgr = StorageManager::new(store, "/prod", "/open");
        let mut audit = AuditLog::in_memory();
        let got = mgr.retrieve("nope", &clear(), Some(&mut audit)).unwrap();
        assert_eq!(ContentStatus::RecordMissing, got.status);
        assert!(got.content.is_none());
        assert_eq!(
            vec![AuditEntry {
                category: AuditCategory::Open,
                path: "nope".into(),
                status: AuditStatus::Missing,
            }],
            audit.entries().to_vec()
        );
    }

    #[test]
    fn altered_piece_is_excluded() {
        let (store, mem) = create_mem_store();
        let mgr = StorageManager::new(store, "/prod", "/open");
        let scheme = Scheme::Threshold(ThresholdScheme {
            total_shares: 3,
            threshold: 2,
            destinations: vec!["a".into(), "b".into(), "c".into()],
        });
        mgr.store(&Secret::text("threshold secret"), "k", &scheme)
            .unwrap();
        mem.overwrite("/prod/b/k", b"00ff");
        let mut audit = AuditLog::in_memory();
        let got = mgr.retrieve("k", &scheme, Some(&mut audit)).unwrap();
        assert_eq!(ContentStatus::Ok, got.status);
        assert_eq!(PieceStatus::Mismatch, got.pieces["b/k"]);
        let lines: Vec<String> =
            audit.entries().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            vec![
                "Content\tk\tOK",
                "Piece\ta/k\tOK",
                "Piece\tb/k\tERROR: length or signature not match",
                "Piece\tc/k\tOK",
            ],
            lines
        );
    }

    #[test]
    fn piece_checks_are_audited_when_combine_fails() {
        let (store, mem) = create_mem_store();
        let mgr = StorageManager::new(store, "/prod", "/open");
        let mut record = mgr.store(&Secret::text("one"), "k", &clear()).unwrap();

        // a clear record never lists two pieces
        mem.overwrite("/prod/extra/k", b"one");
        record
            .storage_pieces
            .insert("extra/k".into(), PieceDigest::of(b"one"));
        mem.overwrite("/open/k.json", &record.to_json().unwrap());

        let mut audit = AuditLog::in_memory();
        assert!(matches!(
            mgr.retrieve("k", &clear(), Some(&mut audit)),
            Err(StoreError::Split(SplitError::UnexpectedPieceCount { .. }))
        ));
        let lines: Vec<String> =
            audit.entries().iter().map(|e| e.to_string()).collect();
        assert_eq!(vec!["Piece\tclear/k\tOK", "Piece\textra/k\tOK"], lines);
    }

    #[test]
    fn export_to_retrieve_dir() {
        let (store, mem) = create_mem_store();
        let mgr = StorageManager::new(store, "/prod", "/open")
            .with_retrieve_dir(Some("/out".into()));
        mgr.store(&Secret::text("exported"), "x/y.txt", &clear())
            .unwrap();
        mgr.retrieve("x/y.txt", &clear(), None).unwrap();
        assert_eq!(Some(b"exported".to_vec()), mem.get("/out/x/y.txt"));
    }

    #[test]
    fn unsafe_logical_path_writes_nothing() {
        let (store, mem) = create_mem_store();
        let mgr = StorageManager::new(store, "/prod", "/open");
        assert!(matches!(
            mgr.store(&Secret::text("x"), "../escape", &clear()),
            Err(StoreError::UnsafePath(_))
        ));
        assert_eq!(0, mem.write_count());
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let (store, mem) = create_mem_store();
        let mgr = StorageManager::new(store, "/prod", "/open");
        mem.overwrite("/open/r.json", b"{not json");
        assert!(matches!(
            mgr.retrieve("r", &clear(), None),
            Err(StoreError::CorruptRecord { .. })
        ));
    }
}
