//! Logvault: a concurrent, file-backed log storage engine
//!
//! Logvault appends structured log records to per-level partition files and
//! answers filtered queries over them:
//! - **Records**: timestamp, per-level id, level, location, message
//! - **Partitions**: one text file per level and day, one record per line
//! - **Concurrency**: per-file reader/writer locks, per-level id counters
//! - **Queries**: full scans with exact-match and date-range filters
//!
//! # Quick Start
//!
//! ```no_run
//! use logvault::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let store = LogStore::open(LogVaultConfig::new("./logs"))?;
//!
//! let record = store.write(Level::Error, "svc.rs:10", "boom")?;
//! assert!(record.id > 0);
//!
//! let errors = store.query(&Filter::level(Level::Error).location("svc.rs:10"))?;
//! assert!(errors.is_complete());
//! assert!(!errors.records.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub use logvault_core::{
    clock::{Clock, FixedClock, SystemClock},
    codec,
    config::{LogVaultConfig, Partitioning, CONFIG_ENV_VAR},
    counter::LevelCounter,
    error::{LogVaultError, Result},
    lock_registry::{LockRegistry, PathLock},
    observe,
    types::{
        DateCount, Filter, FindResults, Level, LevelSelector, OrderBy, QueryOutcome, Record,
        RecordId, RANGE_TOLERANCE_SECS,
    },
};

pub use logvault_file::{
    recover_counters, LevelStats, LogStore, LogStoreBuilder, PartitionLayout, StoreStats,
    PARTITION_DATE_FORMAT, PARTITION_EXTENSION,
};
