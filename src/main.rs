//! Holdout - Split a TSV dataset into train and test subsets
//!
//! Loads the whole file, samples the train rows at random and prints the
//! first rows of the resulting train set.

use anyhow::{Context, Result};
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use holdout::data::Dataset;
use holdout::split::{split, Proportion};

/// Holdout - Randomly split a tab-separated dataset into train and test sets
#[derive(FromArgs)]
struct Args {
    /// path to the TSV file to split ("-" reads stdin)
    #[argh(positional, default = "String::from(\"newspaper_titles.tsv\")")]
    file: String,

    /// fraction of rows assigned to the train set, within [0, 1]
    #[argh(option, short = 'p', default = "Proportion::default()")]
    proportion: Proportion,

    /// seed for a reproducible split (fresh randomness when omitted)
    #[argh(option, short = 's')]
    seed: Option<u64>,

    /// number of train rows to print
    #[argh(option, short = 'n', default = "5")]
    rows: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("holdout=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();

    let dataset = if args.file == "-" {
        Dataset::from_stdin()?
    } else {
        Dataset::open(&args.file)
            .with_context(|| format!("Failed to open dataset: {}", args.file))?
    };
    tracing::info!(
        "Loaded {} rows ({}) from {}",
        dataset.row_count(),
        dataset.size_human(),
        dataset.source
    );

    let (train, test) = split(&dataset, args.proportion.get(), args.seed)?;
    tracing::info!(
        "Split with proportion {}: {} train rows, {} test rows",
        args.proportion,
        train.row_count(),
        test.row_count()
    );

    print!("{}", train.head(args.rows));

    Ok(())
}
