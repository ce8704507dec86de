//! Holdout - Train/test splitter
//!
//! Partitions a dataset's rows into a training subset and a testing subset.
//!
//! Membership of the train set is drawn uniformly at random without
//! replacement, and its rows come out in draw order. The test set keeps the
//! leftover rows in their original relative order. Both outputs are new
//! datasets indexed from 0; the input is only borrowed.
//!
//! Without a seed the generator is seeded from OS entropy, so repeated calls
//! yield different partitions. Pass a seed to make a split reproducible.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

use crate::data::Dataset;
use crate::error::{SplitError, SplitResult};

/// Fraction of rows assigned to the train set, guaranteed to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Proportion(f64);

impl Proportion {
    /// Validate a raw fraction. NaN and infinities are rejected too.
    pub fn new(value: f64) -> SplitResult<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SplitError::InvalidProportion(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Number of train rows for a dataset of `total` rows.
    ///
    /// Rounds half to even, so 0.5 of 5 rows gives 2 and 0.5 of 7 gives 4.
    pub fn train_count(self, total: usize) -> usize {
        let count = (self.0 * total as f64).round_ties_even() as usize;
        count.min(total)
    }
}

impl Default for Proportion {
    fn default() -> Self {
        Self(0.5)
    }
}

impl FromStr for Proportion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|e| format!("invalid proportion '{}': {}", s, e))?;
        Self::new(value).map_err(|e| e.to_string())
    }
}

impl fmt::Display for Proportion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split `data` into `(train, test)`.
///
/// `train_proportion` must lie in `[0, 1]`; anything else fails with
/// [`SplitError::InvalidProportion`] before any sampling happens. With
/// `seed: None` every call draws a fresh partition.
pub fn split(
    data: &Dataset,
    train_proportion: f64,
    seed: Option<u64>,
) -> SplitResult<(Dataset, Dataset)> {
    let proportion = Proportion::new(train_proportion)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(split_with_rng(data, proportion, &mut rng))
}

/// Split `data` using a caller-supplied random source.
pub fn split_with_rng<R: Rng + ?Sized>(
    data: &Dataset,
    proportion: Proportion,
    rng: &mut R,
) -> (Dataset, Dataset) {
    let total = data.row_count();
    let train_count = proportion.train_count(total);

    let picked = index::sample(rng, total, train_count).into_vec();

    let mut in_train = vec![false; total];
    for &i in &picked {
        in_train[i] = true;
    }

    let train = data.select(picked);
    let test = data.select((0..total).filter(|&i| !in_train[i]));

    tracing::debug!(
        "Dataset split: {} train, {} test (proportion {})",
        train.row_count(),
        test.row_count(),
        proportion
    );

    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Dataset {
        let rows = (0..n)
            .map(|i| vec![i.to_string(), format!("title {}", i)])
            .collect();
        Dataset::new(vec!["id", "title"], rows).unwrap()
    }

    fn ids(data: &Dataset) -> Vec<usize> {
        data.rows()
            .map(|r| r.get("id").unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_proportion_bounds() {
        assert!(Proportion::new(0.0).is_ok());
        assert!(Proportion::new(1.0).is_ok());
        assert!(Proportion::new(0.25).is_ok());
        assert_eq!(
            Proportion::new(-0.1),
            Err(SplitError::InvalidProportion(-0.1))
        );
        assert_eq!(
            Proportion::new(1.01),
            Err(SplitError::InvalidProportion(1.01))
        );
        assert!(Proportion::new(f64::NAN).is_err());
        assert!(Proportion::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_proportion_from_str() {
        assert_eq!("0.5".parse::<Proportion>().unwrap().get(), 0.5);
        assert_eq!(" 1 ".parse::<Proportion>().unwrap().get(), 1.0);
        assert!("2".parse::<Proportion>().is_err());
        assert!("half".parse::<Proportion>().is_err());
    }

    #[test]
    fn test_train_count_rounding() {
        let half = Proportion::new(0.5).unwrap();
        assert_eq!(half.train_count(10), 5);
        assert_eq!(half.train_count(5), 2);
        assert_eq!(half.train_count(7), 4);
        assert_eq!(half.train_count(0), 0);
        assert_eq!(Proportion::new(0.33).unwrap().train_count(10), 3);
        assert_eq!(Proportion::new(1.0).unwrap().train_count(9), 9);
    }

    #[test]
    fn test_split_sizes() {
        let data = numbered(10);
        let (train, test) = split(&data, 0.5, Some(7)).unwrap();
        assert_eq!(train.row_count(), 5);
        assert_eq!(test.row_count(), 5);
    }

    #[test]
    fn test_split_partitions_rows() {
        let data = numbered(37);
        for seed in 0..20 {
            let (train, test) = split(&data, 0.3, Some(seed)).unwrap();
            let mut all = ids(&train);
            all.extend(ids(&test));
            all.sort_unstable();
            assert_eq!(all, (0..37).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_test_set_keeps_original_order() {
        let data = numbered(25);
        let (_, test) = split(&data, 0.6, Some(3)).unwrap();
        let test_ids = ids(&test);
        assert!(test_ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_outputs_hold_drawn_rows_from_zero() {
        let data = numbered(12);
        let drawn = index::sample(&mut StdRng::seed_from_u64(11), 12, 6).into_vec();
        let rest: Vec<usize> = (0..12).filter(|i| !drawn.contains(i)).collect();

        let (train, test) = split(&data, 0.5, Some(11)).unwrap();
        assert_eq!(ids(&train), drawn);
        assert_eq!(ids(&test), rest);

        for (pos, &original) in drawn.iter().enumerate() {
            let row = train.row(pos).unwrap();
            assert_eq!(row.get("title"), Some(format!("title {}", original).as_str()));
        }
        assert!(train.row(drawn.len()).is_none());
        assert_eq!(test.row(0).unwrap().get("id"), Some(rest[0].to_string().as_str()));
        assert!(test.row(rest.len()).is_none());
    }

    #[test]
    fn test_seed_is_reproducible() {
        let data = numbered(50);
        let a = split(&data, 0.5, Some(42)).unwrap();
        let b = split(&data, 0.5, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_with_rng_matches_seeded_split() {
        let data = numbered(20);
        let mut rng = StdRng::seed_from_u64(9);
        let direct = split_with_rng(&data, Proportion::new(0.4).unwrap(), &mut rng);
        assert_eq!(direct, split(&data, 0.4, Some(9)).unwrap());
    }

    #[test]
    fn test_boundaries() {
        let data = numbered(8);

        let (train, test) = split(&data, 0.0, Some(1)).unwrap();
        assert!(train.is_empty());
        assert_eq!(test, data);

        let (train, test) = split(&data, 1.0, Some(1)).unwrap();
        assert!(test.is_empty());
        let mut train_ids = ids(&train);
        train_ids.sort_unstable();
        assert_eq!(train_ids, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_dataset() {
        let data = numbered(0);
        let (train, test) = split(&data, 0.5, None).unwrap();
        assert!(train.is_empty());
        assert!(test.is_empty());
        assert_eq!(train.columns(), data.columns());
    }

    #[test]
    fn test_invalid_proportion_fails_fast() {
        let data = numbered(4);
        assert_eq!(
            split(&data, 1.5, Some(0)).unwrap_err(),
            SplitError::InvalidProportion(1.5)
        );
    }
}
