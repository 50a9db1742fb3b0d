use crate::error::{LogVaultError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a JSON config file for [`LogVaultConfig::from_env`].
pub const CONFIG_ENV_VAR: &str = "LOGVAULT_CONFIG";

/// How records of one level are split across files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Partitioning {
    /// One file per level per UTC calendar day: `<LEVEL>/<YYYY-MM-DD>.log` (default).
    #[default]
    Daily,

    /// A single file per level: `<LEVEL>/<LEVEL>.log`.
    PerLevel,
}

/// Configuration for a file-backed log store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogVaultConfig {
    /// Root of the partition tree; one sub-directory per level.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    #[serde(default)]
    pub partitioning: Partitioning,

    /// `fsync` the partition after every append (default: false)
    ///
    /// Appends are always flushed to the OS before `write` returns. With this
    /// enabled they are also forced to stable storage, at a large latency cost.
    #[serde(default)]
    pub sync_on_write: bool,

    /// Default and maximum page size for paginated reads (default: 100)
    #[serde(default = "default_results_limit")]
    pub results_limit: usize,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_results_limit() -> usize {
    100
}

impl Default for LogVaultConfig {
    fn default() -> Self {
        Self::new(default_base_dir())
    }
}

impl LogVaultConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            partitioning: Partitioning::default(),
            sync_on_write: false,
            results_limit: default_results_limit(),
        }
    }

    pub fn with_partitioning(mut self, partitioning: Partitioning) -> Self {
        self.partitioning = partitioning;
        self
    }

    pub fn with_sync_on_write(mut self, sync: bool) -> Self {
        self.sync_on_write = sync;
        self
    }

    pub fn with_results_limit(mut self, limit: usize) -> Self {
        self.results_limit = limit;
        self
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            LogVaultError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|e| {
            LogVaultError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the file named by `LOGVAULT_CONFIG`, or defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::from_json_file(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.results_limit == 0 {
            return Err(LogVaultError::Config(
                "results_limit must be greater than zero".into(),
            ));
        }
        if self.base_dir.as_os_str().is_empty() {
            return Err(LogVaultError::Config("base_dir must not be empty".into()));
        }
        Ok(())
    }
}
