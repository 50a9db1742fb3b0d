use crate::layout::PartitionLayout;
use crate::recovery;
use chrono::{NaiveDate, SubsecRound};
use logvault_core::{
    codec, observe, Clock, DateCount, Filter, FindResults, Level, LevelCounter, LevelSelector,
    LockRegistry, LogVaultConfig, LogVaultError, QueryOutcome, Record, RecordId, Result,
    SystemClock,
};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// File-backed, level-partitioned log store
///
/// Safe to share between threads (`Arc<LogStore>`). Appends to the same
/// partition are serialized by that partition's write lock; appends to
/// different partitions and all scans proceed in parallel.
pub struct LogStore {
    config: LogVaultConfig,
    layout: PartitionLayout,
    registry: Arc<LockRegistry>,
    counter: Arc<LevelCounter>,
    clock: Arc<dyn Clock>,
}

/// Builder for [`LogStore`] with injectable collaborators.
///
/// Stores that share a registry and counter coordinate with each other as if
/// they were one store; by default each store gets fresh instances.
pub struct LogStoreBuilder {
    config: LogVaultConfig,
    registry: Option<Arc<LockRegistry>>,
    counter: Option<Arc<LevelCounter>>,
    clock: Option<Arc<dyn Clock>>,
    recover: bool,
}

impl LogStoreBuilder {
    pub fn registry(mut self, registry: Arc<LockRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn counter(mut self, counter: Arc<LevelCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Skip seeding the counter from disk (default: recover).
    ///
    /// Only useful when the supplied counter has already been seeded.
    pub fn skip_recovery(mut self) -> Self {
        self.recover = false;
        self
    }

    pub fn open(self) -> Result<LogStore> {
        self.config.validate()?;
        std::fs::create_dir_all(&self.config.base_dir)?;

        let layout = PartitionLayout::new(&self.config.base_dir, self.config.partitioning);
        let counter = self.counter.unwrap_or_default();
        if self.recover {
            recovery::recover_counters(&layout, &counter)?;
        }

        tracing::info!(
            "Opened log store at {} ({:?} partitions)",
            self.config.base_dir.display(),
            self.config.partitioning
        );

        Ok(LogStore {
            config: self.config,
            layout,
            registry: self.registry.unwrap_or_default(),
            counter,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        })
    }
}

impl LogStore {
    /// Open (creating if needed) a store and recover counters from disk.
    pub fn open(config: LogVaultConfig) -> Result<Self> {
        Self::builder(config).open()
    }

    pub fn builder(config: LogVaultConfig) -> LogStoreBuilder {
        LogStoreBuilder {
            config,
            registry: None,
            counter: None,
            clock: None,
            recover: true,
        }
    }

    pub fn config(&self) -> &LogVaultConfig {
        &self.config
    }

    pub fn layout(&self) -> &PartitionLayout {
        &self.layout
    }

    pub fn registry(&self) -> &Arc<LockRegistry> {
        &self.registry
    }

    pub fn counter(&self) -> &Arc<LevelCounter> {
        &self.counter
    }

    // ------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------

    /// Append one record and return it as persisted.
    ///
    /// The id is drawn while the partition's write lock is held, so ids in a
    /// partition are strictly increasing in append order. If the append
    /// fails the id is handed back to the counter before the error returns.
    pub fn write(
        &self,
        level: Level,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Record> {
        let start = Instant::now();
        let result = self.append(level, location.into(), message.into());
        observe::record_write(start.elapsed(), result.is_ok());
        result
    }

    /// Append using a textual level (case-insensitive) and return the id.
    ///
    /// `ALL` and unknown names fail with `InvalidLevel`; an empty location or
    /// message fails with `EmptyField`.
    pub fn write_id(&self, level: &str, location: &str, message: &str) -> Result<RecordId> {
        let level: Level = level.parse()?;
        if location.is_empty() {
            return Err(LogVaultError::EmptyField { field: "location" });
        }
        if message.is_empty() {
            return Err(LogVaultError::EmptyField { field: "message" });
        }
        self.write(level, location, message).map(|record| record.id)
    }

    fn append(&self, level: Level, location: String, message: String) -> Result<Record> {
        let now = self.clock.now().trunc_subsecs(0);
        let path = self.layout.partition_path(level, now.date_naive());
        self.layout.ensure_level_dir(level)?;

        let lock = self.registry.lock(&path);
        let _guard = lock.write();

        let id = self.counter.next(level)?;
        let record = Record {
            created_at: now,
            id,
            level,
            location,
            message,
        };

        if let Err(e) = self.append_line(&path, &codec::encode(&record)) {
            if self.counter.release(level, id) {
                tracing::warn!("Append to {} failed, released {} id {}", path.display(), level, id);
            } else {
                tracing::warn!(
                    "Append to {} failed, {} id {} left unused",
                    path.display(),
                    level,
                    id
                );
            }
            return Err(e);
        }

        tracing::debug!("Appended {} id {} to {}", level, id, path.display());
        Ok(record)
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        if self.config.sync_on_write {
            writer.get_ref().sync_data()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Every record matching `filter`.
    ///
    /// Without `order_by`, records come back level by level, partition by
    /// partition (file name order), in append order within a partition. A
    /// malformed line drops that partition's records and adds a
    /// `MalformedPartition` error to the outcome; the other partitions are
    /// still scanned. I/O failures fail the whole call. `limit` and `page`
    /// are ignored here, see [`LogStore::find`].
    pub fn query(&self, filter: &Filter) -> Result<QueryOutcome> {
        filter.validate()?;
        let start = Instant::now();
        let mut files_scanned = 0u64;
        let mut outcome = QueryOutcome::default();

        for level in filter.level.levels() {
            for path in self.layout.partitions(level)? {
                files_scanned += 1;
                match self.scan_partition(&path, level, filter) {
                    Ok(records) => outcome.records.extend(records),
                    Err(e) if e.is_malformed() => {
                        tracing::warn!("Skipping partition: {}", e);
                        outcome.errors.push(e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        if let Some(order_by) = filter.order_by {
            order_by.sort(&mut outcome.records);
        }

        observe::record_query(start.elapsed(), files_scanned, outcome.records.len() as u64);
        tracing::debug!(
            "Query over {} scanned {} partitions, {} matches, {} failed",
            filter.level,
            files_scanned,
            outcome.records.len(),
            outcome.errors.len()
        );
        Ok(outcome)
    }

    /// One page of matching records.
    ///
    /// The page size is `filter.limit`, capped at (and defaulting to) the
    /// configured `results_limit`; `filter.page` is zero-based. Fails with the
    /// first `MalformedPartition` if any partition could not be decoded.
    pub fn find(&self, filter: &Filter) -> Result<FindResults> {
        let limit = filter
            .limit
            .unwrap_or(self.config.results_limit)
            .min(self.config.results_limit);
        let all = self.query(filter)?.into_result()?;
        let total = all.len() as u64;
        let skip = limit.saturating_mul(filter.page);
        let records: Vec<Record> = all.into_iter().skip(skip).take(limit).collect();
        let shown = skip.saturating_add(records.len()) as u64;

        Ok(FindResults {
            records,
            total,
            remaining: total.saturating_sub(shown),
            limit,
            page: filter.page,
        })
    }

    /// Number of records matching `filter`.
    ///
    /// Like [`LogStore::find`], fails if any partition could not be decoded.
    pub fn count(&self, filter: &Filter) -> Result<u64> {
        let unordered = Filter {
            order_by: None,
            ..filter.clone()
        };
        Ok(self.query(&unordered)?.into_result()?.len() as u64)
    }

    /// Matching records grouped by UTC creation day and level.
    ///
    /// Sorted by date, then level.
    pub fn count_by_dates(&self, filter: &Filter) -> Result<Vec<DateCount>> {
        let unordered = Filter {
            order_by: None,
            ..filter.clone()
        };
        let mut groups: BTreeMap<(NaiveDate, Level), u64> = BTreeMap::new();
        for record in self.query(&unordered)?.into_result()? {
            *groups
                .entry((record.created_at.date_naive(), record.level))
                .or_insert(0) += 1;
        }
        Ok(groups
            .into_iter()
            .map(|((date, level), count)| DateCount { date, level, count })
            .collect())
    }

    /// The record with `id` at `level`.
    pub fn get(&self, level: Level, id: RecordId) -> Result<Record> {
        self.query(&Filter::level(level).id(id))?
            .into_result()?
            .into_iter()
            .next()
            .ok_or_else(|| LogVaultError::NotFound(format!("{} record {}", level, id)))
    }

    /// Existing partition files for the selected level(s), in scan order.
    pub fn partitions(&self, selector: LevelSelector) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for level in selector.levels() {
            paths.extend(self.layout.partitions(level)?);
        }
        Ok(paths)
    }

    /// Per-level partition counts, sizes and counter positions.
    pub fn stats(&self) -> Result<StoreStats> {
        let mut levels = Vec::with_capacity(Level::ALL.len());
        for level in Level::ALL {
            let partitions = self.layout.partitions(level)?;
            let mut total_bytes = 0u64;
            for path in &partitions {
                total_bytes += std::fs::metadata(path)?.len();
            }
            levels.push(LevelStats {
                level,
                partition_count: partitions.len(),
                total_bytes,
                last_id: self.counter.current(level),
            });
        }
        Ok(StoreStats { levels })
    }

    /// Decode one partition under its read lock.
    ///
    /// Returns only after the whole file decoded cleanly; the first bad line
    /// discards everything read from this file.
    fn scan_partition(&self, path: &Path, level: Level, filter: &Filter) -> Result<Vec<Record>> {
        let lock = self.registry.lock(path);
        let _guard = lock.read();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut matched = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line_no = index + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    return Err(LogVaultError::malformed("line is not valid UTF-8")
                        .in_partition(path, line_no))
                }
                Err(e) => return Err(e.into()),
            };
            if line.is_empty() {
                continue;
            }
            let record = codec::decode(&line, level).map_err(|e| e.in_partition(path, line_no))?;
            if filter.matches(&record) {
                matched.push(record);
            }
        }

        tracing::debug!("Scanned {}: {} matches", path.display(), matched.len());
        Ok(matched)
    }
}

/// Statistics for one level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStats {
    pub level: Level,

    /// Number of partition files
    pub partition_count: usize,

    /// Bytes across all partition files
    pub total_bytes: u64,

    /// Last id handed out by the counter
    pub last_id: RecordId,
}

/// Statistics about the whole store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub levels: Vec<LevelStats>,
}

impl StoreStats {
    pub fn partition_count(&self) -> usize {
        self.levels.iter().map(|l| l.partition_count).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.levels.iter().map(|l| l.total_bytes).sum()
    }
}
