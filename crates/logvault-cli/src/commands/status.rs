//! Status command implementation

use anyhow::{Context, Result};
use logvault::prelude::*;

pub fn execute(config: LogVaultConfig) -> Result<()> {
    tracing::info!("Checking store status: {}", config.base_dir.display());

    let store = LogStore::open(config).context("Failed to open log store")?;
    let stats = store.stats().context("Failed to collect statistics")?;

    println!("\nLog Store Status");
    println!("{}", "=".repeat(60));
    println!("Path: {}", store.config().base_dir.display());
    println!("Partitioning: {:?}", store.config().partitioning);
    println!();
    println!("{:<8} {:>10} {:>14} {:>10}", "LEVEL", "FILES", "BYTES", "LAST ID");
    for level in &stats.levels {
        println!(
            "{:<8} {:>10} {:>14} {:>10}",
            level.level, level.partition_count, level.total_bytes, level.last_id
        );
    }
    println!(
        "{:<8} {:>10} {:>14}",
        "TOTAL",
        stats.partition_count(),
        stats.total_bytes()
    );

    Ok(())
}
