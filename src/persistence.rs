//! Durable storage for the streak ledger.
//!
//! Only the ledger is stored. Teams and run state are transient and are
//! rebuilt from scratch after a restart.

use crate::errors::PersistenceResult;
use crate::ledger::{LedgerSnapshot, StreakLedger};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// A JSON file holding the full ledger snapshot.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored snapshot. `Ok(None)` if nothing has been saved yet.
    pub fn read_snapshot(&self) -> PersistenceResult<Option<LedgerSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(Some(snapshot))
    }

    /// Replace the stored snapshot. Writes a sibling temp file and renames it
    /// over the target, so a crash mid-write leaves the previous snapshot.
    pub fn write_snapshot(&self, snapshot: &LedgerSnapshot) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(snapshot)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Load the ledger for process start. A missing store gives an empty
    /// ledger; an unreadable or malformed one is logged and also gives an
    /// empty ledger.
    pub fn load(&self) -> StreakLedger {
        match self.read_snapshot() {
            Ok(Some(snapshot)) => {
                let ledger = StreakLedger::from_snapshot(&snapshot);
                info!(path = %self.path.display(), players = ledger.len(), "loaded streak ledger");
                ledger
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "no streak ledger yet, starting empty");
                StreakLedger::new()
            }
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "failed to load streak ledger, starting empty");
                StreakLedger::new()
            }
        }
    }

    /// Save the ledger. Failure is logged and reported as `false`; the
    /// in-memory ledger stays authoritative either way.
    pub fn save(&self, ledger: &StreakLedger) -> bool {
        match self.write_snapshot(&ledger.snapshot()) {
            Ok(()) => {
                debug!(path = %self.path.display(), players = ledger.len(), "saved streak ledger");
                true
            }
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "failed to save streak ledger");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StreakRecord;
    use pretty_assertions::assert_eq;
    use schema::PlayerId;

    #[test]
    fn test_missing_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("battletower.json"));
        assert!(store.read_snapshot().unwrap().is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load_on_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("battletower.json");

        let mut ledger = StreakLedger::new();
        for _ in 0..6 {
            ledger.record_win(&PlayerId::new("ash"));
        }
        ledger.record_loss(&PlayerId::new("ash"));
        ledger.record_win(&PlayerId::new("misty"));
        assert!(LedgerStore::new(&path).save(&ledger));

        let reloaded = LedgerStore::new(&path).load();
        assert_eq!(reloaded, ledger);
        assert_eq!(
            reloaded.record(&PlayerId::new("ash")),
            StreakRecord { current: 0, max: 6 }
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_malformed_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("battletower.json");
        fs::write(&path, r#"{ "winStreaks": [["ash", -3]] }"#).unwrap();

        let store = LedgerStore::new(&path);
        assert!(store.read_snapshot().is_err());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_reads_store_missing_one_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("battletower.json");
        fs::write(&path, r#"{ "winStreaks": [["ash", 2]] }"#).unwrap();

        let ledger = LedgerStore::new(&path).load();
        assert_eq!(
            ledger.record(&PlayerId::new("ash")),
            StreakRecord { current: 2, max: 2 }
        );
    }

    #[test]
    fn test_failed_save_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let store = LedgerStore::new(blocker.join("battletower.json"));

        let mut ledger = StreakLedger::new();
        ledger.record_win(&PlayerId::new("ash"));
        assert!(!store.save(&ledger));
        assert_eq!(ledger.len(), 1);
    }
}
