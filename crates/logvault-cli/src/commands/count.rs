//! Count command implementation

use anyhow::{Context, Result};
use logvault::prelude::*;

pub fn execute(config: LogVaultConfig, filter: Filter, by_date: bool) -> Result<()> {
    let store = LogStore::open(config).context("Failed to open log store")?;

    if by_date {
        let groups = store
            .count_by_dates(&filter)
            .context("Failed to count records")?;
        if groups.is_empty() {
            println!("No records");
        }
        for group in groups {
            println!("{}  {:<7}  {}", group.date, group.level, group.count);
        }
    } else {
        let count = store.count(&filter).context("Failed to count records")?;
        println!("{}", count);
    }
    Ok(())
}
