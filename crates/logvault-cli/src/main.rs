//! Logvault CLI - Command-line interface for logvault stores

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use logvault::prelude::*;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "logvault")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Root directory of the partition tree (overrides the config file)
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, env = "LOGVAULT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append a record and print its id
    Write {
        /// DEBUG, INFO, WARNING, ERROR or FATAL (case-insensitive)
        level: String,

        /// Message text
        message: String,

        /// Origin of the record, e.g. "src/main.rs:10"
        #[arg(short, long)]
        location: String,
    },

    /// Print records matching a filter
    Query {
        #[command(flatten)]
        filter: FilterArgs,

        /// Sort descending by created_at, id, location or level
        #[arg(long)]
        order_by: Option<OrderBy>,

        /// Page size (capped by the configured results limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Zero-based page number
        #[arg(long)]
        page: Option<usize>,

        /// Print JSON instead of one line per record
        #[arg(long)]
        json: bool,
    },

    /// Count records matching a filter
    Count {
        #[command(flatten)]
        filter: FilterArgs,

        /// Group counts by day and level
        #[arg(long)]
        by_date: bool,
    },

    /// Partition and counter status
    Status,
}

/// Search fields shared by `query` and `count`
#[derive(Args)]
struct FilterArgs {
    /// Level to search, or ALL
    #[arg(default_value = "ALL")]
    level: LevelSelector,

    /// Exact record id
    #[arg(long)]
    id: Option<RecordId>,

    /// Exact location
    #[arg(long)]
    location: Option<String>,

    /// Exact message
    #[arg(long)]
    message: Option<String>,

    /// Exact creation time
    #[arg(long, value_parser = commands::parse_timestamp)]
    created_at: Option<DateTime<Utc>>,

    /// Earliest creation time (inclusive); a missing --to means now
    #[arg(long, value_parser = commands::parse_timestamp)]
    from: Option<DateTime<Utc>>,

    /// Latest creation time (inclusive); a missing --from means the epoch
    #[arg(long, value_parser = commands::parse_timestamp)]
    to: Option<DateTime<Utc>>,
}

impl FilterArgs {
    fn into_filter(self) -> Filter {
        Filter {
            level: self.level,
            id: self.id,
            location: self.location,
            message: self.message,
            created_at: self.created_at,
            from: self.from,
            to: self.to,
            ..Filter::default()
        }
        .fill_open_range(Utc::now())
    }
}

fn load_config(cli: &Cli) -> Result<LogVaultConfig> {
    let mut config = match &cli.config {
        Some(path) => LogVaultConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LogVaultConfig::default(),
    };
    if let Some(base_dir) = &cli.base_dir {
        config.base_dir = base_dir.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    // Execute command
    match cli.command {
        Commands::Write {
            level,
            message,
            location,
        } => {
            commands::write::execute(config, &level, &location, &message)?;
        }
        Commands::Query {
            filter,
            order_by,
            limit,
            page,
            json,
        } => {
            let paginate = limit.is_some() || page.is_some();
            let filter = Filter {
                order_by,
                limit,
                page: page.unwrap_or(0),
                ..filter.into_filter()
            };
            commands::query::execute(config, filter, paginate, json)?;
        }
        Commands::Count { filter, by_date } => {
            commands::count::execute(config, filter.into_filter(), by_date)?;
        }
        Commands::Status => {
            commands::status::execute(config)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_count_accepts_search_fields() {
        let cli = Cli::try_parse_from([
            "logvault",
            "count",
            "error",
            "--location",
            "svc.rs:10",
            "--from",
            "2024-01-01",
            "--to",
            "2024-02-01",
            "--by-date",
        ])
        .unwrap();

        let Commands::Count { filter, by_date } = cli.command else {
            panic!("expected the count command");
        };
        assert!(by_date);
        let filter = filter.into_filter();
        assert_eq!(filter.level, LevelSelector::One(Level::Error));
        assert_eq!(filter.location.as_deref(), Some("svc.rs:10"));
        assert_eq!(filter.from, Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(filter.to, Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_query_fills_open_range() {
        let cli =
            Cli::try_parse_from(["logvault", "query", "--to", "2024-02-01", "--order-by", "id"])
                .unwrap();

        let Commands::Query {
            filter, order_by, ..
        } = cli.command
        else {
            panic!("expected the query command");
        };
        assert_eq!(order_by, Some(OrderBy::Id));
        let filter = filter.into_filter();
        assert_eq!(filter.level, LevelSelector::All);
        assert_eq!(filter.from, Some(DateTime::<Utc>::UNIX_EPOCH));
    }
}
