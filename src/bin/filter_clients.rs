//! Headless load-and-filter of a processed client CSV.
//!
//! ```text
//! filter_clients <bucket> <key> [--priority LABEL]... [--until YYYY-MM-DD]
//! ```
//!
//! Prints the match count to stderr and the matching rows as CSV to stdout.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use client_desk::config::Config;
use client_desk::data::export::write_csv;
use client_desk::data::filter::{load_and_filter, FilterOutcome};
use client_desk::data::loader::{ObjectStore, StorageLocation};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Filter a processed client CSV by priority and follow-up date"
)]
struct Args {
    /// Bucket holding the processed client CSV.
    bucket: String,
    /// Object key of the CSV inside the bucket.
    key: String,
    /// Priority label to keep; repeat for several. Defaults to every label.
    #[arg(long = "priority", value_name = "LABEL")]
    priorities: Vec<String>,
    /// Last follow-up date to include. Defaults to the latest date present.
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_iso_date)]
    until: Option<NaiveDate>,
}

impl Args {
    fn location(&self) -> StorageLocation {
        StorageLocation::new(self.bucket.as_str(), self.key.as_str())
    }

    fn selected(&self) -> Option<BTreeSet<String>> {
        (!self.priorities.is_empty()).then(|| self.priorities.iter().cloned().collect())
    }
}

fn parse_iso_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("{raw:?} is not YYYY-MM-DD: {e}"))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let location = args.location();
    let config = Config::load();
    let store = ObjectStore::new(
        config.http_client().context("building HTTP client")?,
        config.storage_url.clone(),
    );

    let selected = args.selected();
    let outcome = load_and_filter(
        &store,
        &location,
        selected.as_ref(),
        args.until,
        Local::now().date_naive(),
    )
    .with_context(|| format!("loading {location}"))?;

    match outcome {
        FilterOutcome::Empty => eprintln!("No data found in {location}"),
        FilterOutcome::Matched(view) => {
            eprintln!(
                "{} of {} client(s) match {:?} up to {}",
                view.result.matched_count,
                view.total,
                view.criteria.selected_priorities,
                view.criteria.max_follow_up_date
            );
            write_csv(&view.result.records, std::io::stdout().lock())?;
        }
    }
    Ok(())
}
