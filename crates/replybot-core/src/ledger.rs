//! Persisted record of recently-replied-to authors.
//!
//! One entry per lower-cased handle, mapping to the date of the last reply.
//! Entries age out after [`RETENTION_DAYS`]. The file is a bincode-encoded
//! map, rewritten whole through a temp file on every [`ReplyLedger::persist`].

use crate::api::normalize_handle;
use crate::error::Result;
use crate::io::{self, persistence};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct ReplyLedger {
    path: PathBuf,
    entries: BTreeMap<String, NaiveDate>,
}

impl ReplyLedger {
    /// Empty ledger that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the ledger at `path`. A missing file is an empty ledger; anything
    /// else that prevents reading or decoding it is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let Some(bytes) = io::read_optional(&path)? else {
            tracing::debug!(path = %path.display(), "no ledger yet, starting empty");
            return Ok(Self::new(path));
        };
        let raw: BTreeMap<String, NaiveDate> =
            bincode::deserialize(&bytes).map_err(|e| persistence(&path, e))?;

        // Hand-edited files may carry upper case names; fold them together,
        // keeping the most recent date.
        let mut entries = BTreeMap::new();
        for (handle, date) in raw {
            entries
                .entry(normalize_handle(&handle))
                .and_modify(|d: &mut NaiveDate| *d = (*d).max(date))
                .or_insert(date);
        }
        Ok(Self { path, entries })
    }

    pub fn persist(&self) -> Result<()> {
        let bytes = bincode::serialize(&self.entries).map_err(|e| persistence(&self.path, e))?;
        io::atomic_write(&self.path, &bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    /// False iff the author was replied to within the retention window.
    pub fn is_eligible(&self, handle: &str) -> bool {
        !self.entries.contains_key(&normalize_handle(handle))
    }

    pub fn last_reply(&self, handle: &str) -> Option<NaiveDate> {
        self.entries.get(&normalize_handle(handle)).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, NaiveDate)> {
        self.entries.iter().map(|(h, d)| (h.as_str(), *d))
    }

    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Drop every entry strictly older than `today - RETENTION_DAYS`.
    /// Returns how many were removed.
    pub fn prune(&mut self, today: NaiveDate) -> usize {
        let cutoff = today - chrono::Duration::days(RETENTION_DAYS);
        let before = self.entries.len();
        self.entries.retain(|_, date| *date >= cutoff);
        before - self.entries.len()
    }

    pub fn record(&mut self, handle: &str, today: NaiveDate) {
        self.entries.insert(normalize_handle(handle), today);
    }

    /// Remove a single handle. Returns true if it was present.
    pub fn forget(&mut self, handle: &str) -> bool {
        self.entries.remove(&normalize_handle(handle)).is_some()
    }
}
