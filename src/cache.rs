//! Caller-owned cache for the normalized table.
//!
//! An entry is reused only while the source path, its content hash and the
//! normalize options all match. Any change re-normalizes from scratch.

use crate::config::NormalizeOptions;
use crate::error::NormalizeError;
use crate::loader::{normalize_reader, LoadReport};
use crate::types::PopulationTable;
use crate::util::fnv1a64;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub content_hash: u64,
    pub len: usize,
    pub options: NormalizeOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

#[derive(Debug)]
struct Entry {
    fingerprint: SourceFingerprint,
    table: Arc<PopulationTable>,
    report: LoadReport,
}

#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<Entry>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table for `path`, reading and hashing the file every call
    /// and re-normalizing only when the fingerprint changed.
    ///
    /// On error the entry is dropped, so a stale table is never served for
    /// a source that no longer loads.
    pub fn get_or_load(
        &mut self,
        path: impl AsRef<Path>,
        opts: &NormalizeOptions,
    ) -> Result<(Arc<PopulationTable>, CacheOutcome), NormalizeError> {
        let result = self.load(path.as_ref(), opts);
        if result.is_err() {
            self.entry = None;
        }
        result
    }

    fn load(
        &mut self,
        path: &Path,
        opts: &NormalizeOptions,
    ) -> Result<(Arc<PopulationTable>, CacheOutcome), NormalizeError> {
        let bytes = std::fs::read(path)
            .map_err(|source| NormalizeError::Load { path: path.to_path_buf(), source })?;
        let fingerprint = SourceFingerprint {
            path: path.to_path_buf(),
            content_hash: fnv1a64(&bytes),
            len: bytes.len(),
            options: opts.clone(),
        };

        if let Some(entry) = &self.entry {
            if entry.fingerprint == fingerprint {
                debug!(path = %path.display(), hash = fingerprint.content_hash, "table cache hit");
                return Ok((Arc::clone(&entry.table), CacheOutcome::Hit));
            }
        }

        debug!(path = %path.display(), hash = fingerprint.content_hash, "table cache miss");
        let (table, report) = normalize_reader(bytes.as_slice(), opts)?;
        info!(
            path = %path.display(),
            regions = report.regions,
            records = report.records,
            missing = report.missing_values,
            "normalized population table"
        );
        let table = Arc::new(table);
        self.entry = Some(Entry { fingerprint, table: Arc::clone(&table), report });
        Ok((table, CacheOutcome::Miss))
    }

    /// Load report of the cached table, if any.
    pub fn report(&self) -> Option<&LoadReport> {
        self.entry.as_ref().map(|e| &e.report)
    }

    pub fn table(&self) -> Option<Arc<PopulationTable>> {
        self.entry.as_ref().map(|e| Arc::clone(&e.table))
    }

    pub fn fingerprint(&self) -> Option<&SourceFingerprint> {
        self.entry.as_ref().map(|e| &e.fingerprint)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
