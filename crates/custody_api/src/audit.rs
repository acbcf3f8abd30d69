use crate::*;
use std::io::Write;
use std::path::Path;

/// What an audit line is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditCategory {
    /// loading an integrity record
    Open,
    /// a reconstructed secret
    Content,
    /// one stored piece
    Piece,
    /// comparing a derived value against its retrieved copy
    DerivedRetrieved,
    /// a cross check between related values
    Verify,
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AuditCategory::Open => "OPEN",
            AuditCategory::Content => "Content",
            AuditCategory::Piece => "Piece",
            AuditCategory::DerivedRetrieved => "D/R-Verify",
            AuditCategory::Verify => "VERIFY",
        })
    }
}

/// Outcome recorded on an audit line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditStatus {
    /// present and matching
    Ok,
    /// not present
    Missing,
    /// present but length or digest differ from the record
    Mismatch,
    /// available pieces disagree with each other
    Inconsistent(String),
    /// written during completion
    Saved,
    /// check not performed
    Skipped,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Ok => f.write_str("OK"),
            AuditStatus::Missing => f.write_str("MISSING"),
            AuditStatus::Mismatch => {
                f.write_str("ERROR: length or signature not match")
            }
            AuditStatus::Inconsistent(detail) => {
                write!(f, "INCONSISTENT: {detail}")
            }
            AuditStatus::Saved => f.write_str("SAVED"),
            AuditStatus::Skipped => f.write_str("SKIPPED"),
        }
    }
}

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// what the line is about
    pub category: AuditCategory,
    /// logical or storage path concerned
    pub path: String,
    /// outcome
    pub status: AuditStatus,
}

impl std::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}", self.category, self.path, self.status)
    }
}

/// Tab separated record of everything checked during a run.
///
/// Lines are written as they are recorded. Entries are also kept in
/// memory so callers and tests can inspect them.
pub struct AuditLog {
    writer: Option<Box<dyn Write + Send>>,
    entries: Vec<AuditEntry>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("to_writer", &self.writer.is_some())
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl AuditLog {
    /// An audit log that only keeps entries in memory.
    pub fn in_memory() -> Self {
        Self {
            writer: None,
            entries: Vec::new(),
        }
    }

    /// An audit log that also writes each line to `writer`.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Some(Box::new(writer)),
            entries: Vec::new(),
        }
    }

    /// Create or truncate the file at `path`, creating parent directories.
    pub fn create(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::io(parent, e))?;
        }
        let file =
            std::fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
        tracing::debug!(?path, "audit log opened");
        Ok(Self::from_writer(std::io::BufWriter::new(file)))
    }

    /// Append one line.
    pub fn record(
        &mut self,
        category: AuditCategory,
        path: impl Into<String>,
        status: AuditStatus,
    ) -> StoreResult<()> {
        let entry = AuditEntry {
            category,
            path: path.into(),
            status,
        };
        tracing::trace!(%entry, "audit");
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{entry}").map_err(StoreError::other)?;
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Every line recorded so far.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Flush the underlying writer and hand back the recorded lines.
    pub fn close(mut self) -> StoreResult<Vec<AuditEntry>> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(StoreError::other)?;
        }
        Ok(std::mem::take(&mut self.entries))
    }
}
