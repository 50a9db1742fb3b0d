//! File-based log store implementation
//!
//! Persists records as text lines in per-level partition files and answers
//! filtered queries by scanning them.
//!
//! Features:
//! - One partition per level and UTC day (or one per level)
//! - Per-partition reader/writer locking; unrelated partitions never contend
//! - Per-level record ids, recovered from the newest partition on open
//! - Failed appends hand their id back to the counter
//! - Full linear scans with multi-field filters, ordering and pagination

mod layout;
mod recovery;
mod store;

pub use layout::{PartitionLayout, PARTITION_DATE_FORMAT, PARTITION_EXTENSION};
pub use recovery::recover_counters;
pub use store::{LevelStats, LogStore, LogStoreBuilder, StoreStats};
