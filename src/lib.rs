//! Holdout - Train/test splitting for tab-separated datasets.
//!
//! Loads a TSV file with a header row into memory and partitions its rows
//! into a randomly sampled training subset and the remaining testing subset.
//!
//! ```no_run
//! use holdout::{data::Dataset, split::split};
//!
//! let data = Dataset::open("newspaper_titles.tsv")?;
//! let (train, test) = split(&data, 0.5, Some(42))?;
//! println!("{}", train.head(5));
//! # let _ = test;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod data;
pub mod error;
pub mod split;

pub use data::{Dataset, Row};
pub use error::{SplitError, SplitResult};
pub use split::{split, split_with_rng, Proportion};
