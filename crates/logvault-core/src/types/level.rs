use crate::error::{LogVaultError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a persisted record.
///
/// Declaration order is the enumeration order used when several levels are
/// scanned by one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Level {
    /// Every level that owns partition files.
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Fatal,
    ];

    /// Upper-cased name, also used as the partition directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogVaultError;

    /// Case-insensitive. `WARN` is accepted as an alias of `WARNING`; `ALL`
    /// is rejected because it is not a level a record can be written at.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "FATAL" => Ok(Level::Fatal),
            "ALL" => Err(LogVaultError::InvalidLevel(
                "ALL is a query selector and cannot be written".into(),
            )),
            _ => Err(LogVaultError::InvalidLevel(s.to_string())),
        }
    }
}

/// Level selector used by queries: one level, or every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LevelSelector {
    #[default]
    All,
    #[serde(untagged)]
    One(Level),
}

impl LevelSelector {
    /// Levels whose partitions must be scanned, in enumeration order.
    pub fn levels(&self) -> Vec<Level> {
        match self {
            LevelSelector::All => Level::ALL.to_vec(),
            LevelSelector::One(level) => vec![*level],
        }
    }

    pub fn matches(&self, level: Level) -> bool {
        match self {
            LevelSelector::All => true,
            LevelSelector::One(l) => *l == level,
        }
    }
}

impl From<Level> for LevelSelector {
    fn from(level: Level) -> Self {
        LevelSelector::One(level)
    }
}

impl fmt::Display for LevelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelSelector::All => f.write_str("ALL"),
            LevelSelector::One(level) => level.fmt(f),
        }
    }
}

impl FromStr for LevelSelector {
    type Err = LogVaultError;

    /// An empty string selects every level, matching how an absent level
    /// parameter has always been treated.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("ALL") {
            return Ok(LevelSelector::All);
        }
        trimmed.parse().map(LevelSelector::One)
    }
}
