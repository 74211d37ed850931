//! Rotating report directory.
//!
//! Each report is written to `<dir>/<prefix><YYYYMMDD_HHMMSS.mmm>.txt`. After
//! a write, files of the same prefix beyond the newest `keep` are removed.
//! Names sort chronologically, so "newest" is decided by file name.

use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};

/// Prefix of two-user reports.
pub const CDMA_PREFIX: &str = "cdma_simulation_results_";
/// Prefix of single-user reports.
pub const LINK_PREFIX: &str = "simulation_results_";

const EXTENSION: &str = ".txt";

/// Report files of one kind in one directory.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
    prefix: &'static str,
    keep: usize,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: &'static str, keep: usize) -> Self {
        Self {
            dir: dir.into(),
            prefix,
            keep,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a report taken at `timestamp`.
    pub fn file_name(&self, timestamp: DateTime<Utc>) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            timestamp.format("%Y%m%d_%H%M%S%.3f"),
            EXTENSION
        )
    }

    /// Write `content` and prune older reports. Returns the written path.
    pub fn save(&self, content: &str, timestamp: DateTime<Utc>) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(self.file_name(timestamp));
        std::fs::write(&path, content)?;
        tracing::debug!(path = %path.display(), "report written");
        self.prune()?;
        Ok(path)
    }

    /// Report files of this prefix, oldest first.
    pub fn list(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(self.prefix) && name.ends_with(EXTENSION) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn prune(&self) -> io::Result<()> {
        let files = self.list()?;
        let excess = files.len().saturating_sub(self.keep);
        for old in &files[..excess] {
            match std::fs::remove_file(old) {
                Ok(()) => tracing::debug!(path = %old.display(), "old report removed"),
                Err(e) => {
                    tracing::warn!(path = %old.display(), error = %e, "failed to remove old report")
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap() + chrono::Duration::milliseconds(millis)
    }

    #[test]
    fn test_file_name() {
        let store = ReportStore::new("unused", CDMA_PREFIX, 5);
        assert_eq!(
            store.file_name(at(42)),
            "cdma_simulation_results_20240309_140507.042.txt"
        );
    }

    #[test]
    fn test_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path().join("cdma"), CDMA_PREFIX, 5);

        for i in 0..7 {
            store.save(&format!("report {}", i), at(i * 1500)).unwrap();
        }

        let files = store.list().unwrap();
        assert_eq!(files.len(), 5);
        assert_eq!(files[0], store.dir().join(store.file_name(at(2 * 1500))));
        assert_eq!(
            std::fs::read_to_string(&files[4]).unwrap(),
            "report 6"
        );
    }

    #[test]
    fn test_other_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let foreign = dir.path().join("notes.txt");
        std::fs::write(&foreign, "keep me").unwrap();

        let link = ReportStore::new(dir.path(), LINK_PREFIX, 1);
        let cdma = ReportStore::new(dir.path(), CDMA_PREFIX, 1);
        cdma.save("a", at(0)).unwrap();
        link.save("b", at(1)).unwrap();
        link.save("c", at(2)).unwrap();

        assert!(foreign.exists());
        assert_eq!(cdma.list().unwrap().len(), 1);
        assert_eq!(link.list().unwrap(), vec![dir.path().join(link.file_name(at(2)))]);
    }
}
