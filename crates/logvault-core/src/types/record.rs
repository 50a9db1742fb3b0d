use super::level::Level;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Record identifier, unique and increasing within one level.
pub type RecordId = u64;

/// One persisted log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Creation instant, second precision.
    pub created_at: DateTime<Utc>,

    pub id: RecordId,

    /// Implied by the partition a line lives in; never written into the line.
    pub level: Level,

    /// Free-text origin of the entry (e.g. `src/main.rs:10`).
    pub location: String,

    pub message: String,
}

impl Record {
    pub fn new(
        created_at: DateTime<Utc>,
        id: RecordId,
        level: Level,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            created_at: created_at.trunc_subsecs(0),
            id,
            level,
            location: location.into(),
            message: message.into(),
        }
    }
}
