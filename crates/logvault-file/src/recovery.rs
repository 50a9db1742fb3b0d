//! Counter recovery from partition history

use crate::layout::PartitionLayout;
use logvault_core::{codec, Level, LevelCounter, RecordId, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Seed `counter` for every level from the newest record on disk.
///
/// For each level the most recently modified partition is consulted; if it
/// holds no records yet, older partitions are tried in turn. A level with no
/// records seeds at 0. A malformed last line also seeds at 0 so that damaged
/// history never prevents the store from opening; ids may then be reused.
pub fn recover_counters(layout: &PartitionLayout, counter: &LevelCounter) -> Result<()> {
    for level in Level::ALL {
        let seed = recover_level(layout, level)?;
        counter.seed(level, seed);
        if seed > 0 {
            tracing::info!("Recovered {} counter at id {}", level, seed);
        }
    }
    Ok(())
}

fn recover_level(layout: &PartitionLayout, level: Level) -> Result<RecordId> {
    for path in layout.partitions_newest_first(level)? {
        let Some(line) = last_line(&path)? else {
            continue;
        };
        return match codec::decode(&line, level) {
            Ok(record) => Ok(record.id),
            Err(e) => {
                tracing::warn!(
                    "Last record of {} is unreadable, {} counter restarts at 0: {}",
                    path.display(),
                    level,
                    e
                );
                Ok(0)
            }
        };
    }
    Ok(0)
}

/// Last non-empty line of a partition, if any.
pub(crate) fn last_line(path: &Path) -> Result<Option<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut last = None;
    for line in reader.split(b'\n') {
        let line = line?;
        if !line.is_empty() {
            last = Some(line);
        }
    }
    Ok(last.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use logvault_core::{Partitioning, Record};
    use std::fs;

    fn write_partition(layout: &PartitionLayout, level: Level, name: &str, contents: &str) {
        layout.ensure_level_dir(level).unwrap();
        fs::write(layout.level_dir(level).join(name), contents).unwrap();
    }

    fn line(id: u64) -> String {
        let record = Record::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            id,
            Level::Info,
            "loc",
            "msg",
        );
        codec::encode(&record)
    }

    #[test]
    fn test_empty_tree_seeds_zero() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PartitionLayout::new(dir.path(), Partitioning::Daily);
        let counter = LevelCounter::new();
        recover_counters(&layout, &counter).unwrap();
        for (_, id) in counter.snapshot() {
            assert_eq!(id, 0);
        }
    }

    #[test]
    fn test_seeds_from_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PartitionLayout::new(dir.path(), Partitioning::Daily);
        let contents = format!("{}{}{}\n", line(1), line(2), line(3));
        write_partition(&layout, Level::Info, "2024-01-01.log", &contents);

        let counter = LevelCounter::new();
        recover_counters(&layout, &counter).unwrap();
        assert_eq!(counter.current(Level::Info), 3);
        assert_eq!(counter.current(Level::Error), 0);
        assert_eq!(counter.next(Level::Info).unwrap(), 4);
    }

    #[test]
    fn test_malformed_tail_seeds_zero() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PartitionLayout::new(dir.path(), Partitioning::Daily);
        let contents = format!("{}{}[date=\"oops\n", line(1), line(2));
        write_partition(&layout, Level::Info, "2024-01-01.log", &contents);

        let counter = LevelCounter::new();
        recover_counters(&layout, &counter).unwrap();
        assert_eq!(counter.current(Level::Info), 0);
    }

    #[test]
    fn test_empty_newest_partition_falls_back_to_older() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PartitionLayout::new(dir.path(), Partitioning::Daily);
        write_partition(&layout, Level::Info, "2024-01-01.log", &line(9));
        write_partition(&layout, Level::Info, "2024-01-02.log", "");

        let counter = LevelCounter::new();
        recover_counters(&layout, &counter).unwrap();
        assert_eq!(counter.current(Level::Info), 9);
    }
}
