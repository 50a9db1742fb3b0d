//! Query command implementation

use anyhow::{bail, Context, Result};
use logvault::prelude::*;

use super::render;

pub fn execute(config: LogVaultConfig, filter: Filter, paginate: bool, json: bool) -> Result<()> {
    let store = LogStore::open(config).context("Failed to open log store")?;

    if paginate {
        let results = store.find(&filter).context("Query failed")?;
        if json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }
        for record in &results.records {
            println!("{}", render(record));
        }
        println!(
            "-- page {} ({} per page): {} shown, {} total, {} remaining",
            results.page,
            results.limit,
            results.records.len(),
            results.total,
            results.remaining
        );
        return Ok(());
    }

    let outcome = store.query(&filter).context("Query failed")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.records)?);
    } else {
        if outcome.records.is_empty() && outcome.is_complete() {
            println!("No matching records");
        }
        for record in &outcome.records {
            println!("{}", render(record));
        }
    }

    for err in &outcome.errors {
        tracing::error!("{}", err);
    }
    if !outcome.is_complete() {
        bail!(
            "{} partition(s) could not be read; their records are missing above",
            outcome.errors.len()
        );
    }
    Ok(())
}
