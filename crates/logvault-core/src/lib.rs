//! Logvault Core: types and building blocks for the logvault storage engine
//!
//! This crate holds everything the file-backed store is assembled from:
//! - Record codec: one record per text line, with reversible escaping
//! - Lock registry: one reader/writer lock per partition file
//! - Level counter: per-level monotonically increasing record ids
//! - Filters: multi-field predicates evaluated against decoded records
//!
//! The store itself lives in `logvault-file`.

pub mod clock;
pub mod codec;
pub mod config;
pub mod counter;
pub mod error;
pub mod lock_registry;
pub mod observe;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{LogVaultConfig, Partitioning, CONFIG_ENV_VAR};
pub use counter::LevelCounter;
pub use error::{LogVaultError, Result};
pub use lock_registry::{LockRegistry, PathLock};
pub use types::{
    DateCount, Filter, FindResults, Level, LevelSelector, OrderBy, QueryOutcome, Record,
    RecordId, RANGE_TOLERANCE_SECS,
};
