//! Write command implementation

use anyhow::{Context, Result};
use logvault::prelude::*;

pub fn execute(config: LogVaultConfig, level: &str, location: &str, message: &str) -> Result<()> {
    let store = LogStore::open(config).context("Failed to open log store")?;
    let id = store
        .write_id(level, location, message)
        .with_context(|| format!("Failed to write {} record", level))?;
    println!("{}", id);
    Ok(())
}
