//! Partition file layout on disk
//!
//! ```text
//! <base_dir>/
//! ├── DEBUG/
//! │   ├── 2024-01-01.log
//! │   └── 2024-01-02.log
//! ├── INFO/
//! └── ...
//! ```
//!
//! With `Partitioning::PerLevel` each level directory holds a single
//! `<LEVEL>.log` instead.

use chrono::NaiveDate;
use logvault_core::{Level, Partitioning, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extension of partition files; anything else in a level directory is ignored.
pub const PARTITION_EXTENSION: &str = "log";

/// File name date layout for daily partitions.
pub const PARTITION_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct PartitionLayout {
    base_dir: PathBuf,
    partitioning: Partitioning,
}

impl PartitionLayout {
    pub fn new(base_dir: impl Into<PathBuf>, partitioning: Partitioning) -> Self {
        Self {
            base_dir: base_dir.into(),
            partitioning,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn level_dir(&self, level: Level) -> PathBuf {
        self.base_dir.join(level.as_str())
    }

    /// Partition that a record of `level` created on `date` belongs to.
    pub fn partition_path(&self, level: Level, date: NaiveDate) -> PathBuf {
        let name = match self.partitioning {
            Partitioning::Daily => date.format(PARTITION_DATE_FORMAT).to_string(),
            Partitioning::PerLevel => level.as_str().to_string(),
        };
        self.level_dir(level)
            .join(format!("{}.{}", name, PARTITION_EXTENSION))
    }

    /// Create the level directory if it does not exist yet.
    pub fn ensure_level_dir(&self, level: Level) -> Result<()> {
        fs::create_dir_all(self.level_dir(level))?;
        Ok(())
    }

    /// Every existing partition of `level`, sorted by file name.
    ///
    /// Daily file names sort chronologically. A missing level directory
    /// yields an empty list.
    pub fn partitions(&self, level: Level) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(self.level_dir(level)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_partition = entry.file_type()?.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(PARTITION_EXTENSION);
            if is_partition {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Partitions of `level`, most recently modified first.
    ///
    /// Equal modification times fall back to the greater file name.
    pub fn partitions_newest_first(&self, level: Level) -> Result<Vec<PathBuf>> {
        let mut stamped: Vec<(SystemTime, PathBuf)> = Vec::new();
        for path in self.partitions(level)? {
            let modified = fs::metadata(&path)?
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH);
            stamped.push((modified, path));
        }
        stamped.sort_by(|a, b| b.cmp(a));
        Ok(stamped.into_iter().map(|(_, path)| path).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_paths() {
        let layout = PartitionLayout::new("/data/logs", Partitioning::Daily);
        assert_eq!(
            layout.partition_path(Level::Error, date(2024, 1, 5)),
            PathBuf::from("/data/logs/ERROR/2024-01-05.log")
        );
    }

    #[test]
    fn test_per_level_paths_ignore_date() {
        let layout = PartitionLayout::new("/data/logs", Partitioning::PerLevel);
        assert_eq!(
            layout.partition_path(Level::Warning, date(2024, 1, 5)),
            layout.partition_path(Level::Warning, date(2030, 12, 31)),
        );
        assert_eq!(
            layout.partition_path(Level::Warning, date(2024, 1, 5)),
            PathBuf::from("/data/logs/WARNING/WARNING.log")
        );
    }

    #[test]
    fn test_partitions_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PartitionLayout::new(dir.path(), Partitioning::Daily);
        assert!(layout.partitions(Level::Info).unwrap().is_empty());

        layout.ensure_level_dir(Level::Info).unwrap();
        for name in ["2024-03-01.log", "2024-01-01.log", "notes.txt"] {
            fs::write(layout.level_dir(Level::Info).join(name), "").unwrap();
        }
        fs::create_dir(layout.level_dir(Level::Info).join("nested.log")).unwrap();

        let names: Vec<_> = layout
            .partitions(Level::Info)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["2024-01-01.log", "2024-03-01.log"]);
    }
}
