use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use feedsync_core::{DiffStat, Transaction, TransactionId, TransactionsCollection, TransactionsDiff};
use feedsync_import::import::load_feed_file;
use feedsync_reconcile::{ComparatorConfig, TransactionsComparator};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Compare two exports of the same account feed and report what changed.
#[derive(Parser)]
#[command(name = "feedsync", version)]
struct Cli {
    /// Previously stored export
    old: PathBuf,

    /// Freshly fetched export
    new: PathBuf,

    /// Comparator settings (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the diff as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    stat: DiffStat,
    updated: &'a [(TransactionId, Transaction)],
    new: &'a [Transaction],
    deleted: &'a [TransactionId],
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ComparatorConfig::from_toml(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ComparatorConfig::default(),
    };

    let old = load(&cli.old)?;
    let new = load(&cli.new)?;
    tracing::info!(old = old.len(), new = new.len(), "loaded snapshots");

    let comparator = TransactionsComparator::new(config)
        .with_span(tracing::info_span!("diff", old = %cli.old.display(), new = %cli.new.display()));
    let diff = comparator.diff(&old, &new).context("comparing snapshots")?;

    if cli.json {
        let report = Report {
            stat: diff.stat(),
            updated: diff.updated(),
            new: diff.new_entries(),
            deleted: diff.deleted(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&diff);
    }
    Ok(())
}

fn load(path: &Path) -> anyhow::Result<TransactionsCollection> {
    load_feed_file(path).with_context(|| format!("loading {}", path.display()))
}

fn print_text(diff: &TransactionsDiff) {
    println!("{}", diff.stat());
    for (old_id, tx) in diff.updated() {
        println!("updated  #{old_id} -> {} {} {} {}", tx.date, tx.kind, tx.amount, tx.description);
    }
    for tx in diff.new_entries() {
        println!("new      {} {} {} {} [{}]", tx.date, tx.kind, tx.amount, tx.description, tx.status);
    }
    for old_id in diff.deleted() {
        println!("deleted  #{old_id}");
    }
}
