//! Logvault Prelude
//!
//! Import this to get all commonly used types:
//!
//! ```
//! use logvault::prelude::*;
//! ```

// Store
pub use crate::{LogStore, LogStoreBuilder, StoreStats};

// Core types
pub use crate::{Level, LevelSelector, LogVaultError, Record, RecordId, Result};

// Queries
pub use crate::{DateCount, Filter, FindResults, OrderBy, QueryOutcome};

// Configuration and collaborators
pub use crate::{
    Clock, FixedClock, LevelCounter, LockRegistry, LogVaultConfig, Partitioning, SystemClock,
};

// Re-export common external deps
pub use anyhow;
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use std::sync::Arc;
pub use tracing;
