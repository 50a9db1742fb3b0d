use super::level::{Level, LevelSelector};
use super::record::{Record, RecordId};
use crate::error::{LogVaultError, Result};
use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Slack applied to both ends of a `[from, to]` range, in seconds.
///
/// Timestamps are persisted at second precision, so a bound carrying
/// sub-second digits would otherwise exclude a record from the same second.
pub const RANGE_TOLERANCE_SECS: i64 = 1;

/// Field used to sort query results. Sorting is always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    CreatedAt,
    Id,
    Location,
    #[serde(alias = "log_level")]
    Level,
}

impl OrderBy {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ascending = match self {
            OrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
            OrderBy::Id => a.id.cmp(&b.id),
            OrderBy::Location => a.location.cmp(&b.location),
            OrderBy::Level => a.level.cmp(&b.level),
        };
        ascending.reverse()
    }

    /// Stable descending sort; records that compare equal keep scan order.
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderBy::CreatedAt => "created_at",
            OrderBy::Id => "id",
            OrderBy::Location => "location",
            OrderBy::Level => "level",
        })
    }
}

impl FromStr for OrderBy {
    type Err = LogVaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "created_at" => Ok(OrderBy::CreatedAt),
            "id" => Ok(OrderBy::Id),
            "location" => Ok(OrderBy::Location),
            "level" | "log_level" => Ok(OrderBy::Level),
            other => Err(LogVaultError::InvalidFilter(format!(
                "order_by must be one of created_at, id, location, level; got '{}'",
                other
            ))),
        }
    }
}

/// Query predicate. Every `None` field is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub level: LevelSelector,

    #[serde(default)]
    pub id: Option<RecordId>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    /// Exact creation instant, compared at second precision.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Inclusive lower bound, widened by [`RANGE_TOLERANCE_SECS`].
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,

    /// Inclusive upper bound, widened by [`RANGE_TOLERANCE_SECS`].
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,

    #[serde(default)]
    pub order_by: Option<OrderBy>,

    /// Page size for paginated reads; `None` means the store default.
    #[serde(default)]
    pub limit: Option<usize>,

    /// Zero-based page index for paginated reads.
    #[serde(default)]
    pub page: usize,
}

impl Filter {
    /// Filter matching every record of every level.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter scoped to one level (or `LevelSelector::All`).
    pub fn level(level: impl Into<LevelSelector>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Fill a half-open range: a lone `from` gets `to = now`, a lone `to`
    /// gets `from = 1970-01-01T00:00:00Z`.
    pub fn fill_open_range(mut self, now: DateTime<Utc>) -> Self {
        match (self.from, self.to) {
            (Some(_), None) => self.to = Some(now),
            (None, Some(_)) => self.from = Some(DateTime::<Utc>::UNIX_EPOCH),
            _ => {}
        }
        self
    }

    /// Reject filters that can never be evaluated meaningfully.
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(LogVaultError::InvalidFilter(format!(
                    "from ({}) is after to ({})",
                    from, to
                )));
            }
        }
        if self.limit == Some(0) {
            return Err(LogVaultError::InvalidFilter(
                "limit must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// True when the filter carries no temporal constraint at all.
    pub fn is_timeless(&self) -> bool {
        self.created_at.is_none() && self.from.is_none() && self.to.is_none()
    }

    /// Evaluate the predicate against one decoded record.
    pub fn matches(&self, record: &Record) -> bool {
        if !self.level.matches(record.level) {
            return false;
        }
        if self.id.is_some_and(|id| id != record.id) {
            return false;
        }
        if self
            .location
            .as_deref()
            .is_some_and(|location| location != record.location)
        {
            return false;
        }
        if self
            .message
            .as_deref()
            .is_some_and(|message| message != record.message)
        {
            return false;
        }
        if self.is_timeless() {
            return true;
        }

        let tolerance = Duration::seconds(RANGE_TOLERANCE_SECS);
        if let Some(at) = self.created_at {
            if at.trunc_subsecs(0) != record.created_at {
                return false;
            }
        }
        if let Some(from) = self.from {
            let from = from.checked_sub_signed(tolerance).unwrap_or(from);
            if record.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            let to = to.checked_add_signed(tolerance).unwrap_or(to);
            if record.created_at > to {
                return false;
            }
        }
        true
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindResults {
    pub records: Vec<Record>,

    /// Matches across all pages.
    pub total: u64,

    /// Matches on pages after this one.
    pub remaining: u64,

    pub limit: usize,

    pub page: usize,
}

/// Matches from every partition that decoded cleanly, plus one
/// `MalformedPartition` error per partition that did not.
///
/// A failed partition contributes no records at all.
#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub records: Vec<Record>,
    pub errors: Vec<LogVaultError>,
}

impl QueryOutcome {
    /// True when every scanned partition decoded cleanly.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// The records, or the first partition error if any partition failed.
    pub fn into_result(self) -> Result<Vec<Record>> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }
}

/// Number of records created on one calendar day at one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub level: Level,
    pub count: u64,
}
