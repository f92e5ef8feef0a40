use std::ops::Range;

use super::view::{Dataset, Subset};
use crate::{MlErr, Result};

/// A partition of a dataset into a contiguous training prefix and a test range right after it.
///
/// The training range holds `floor(len * train_fraction)` rows and the test range
/// `ceil(len * test_fraction)` rows, clamped to the end of the dataset. Rounding may leave
/// rows after the test range unused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    train: Range<usize>,
    test: Range<usize>,
}

impl Split {
    /// Creates a new `Split`.
    ///
    /// # Arguments
    /// * `len` - The amount of rows of the dataset being split.
    /// * `train_fraction` - The fraction of rows used for training.
    /// * `test_fraction` - The fraction of rows used for testing.
    ///
    /// # Returns
    /// The split or `MlErr::InvalidConfig` if the fractions are out of `[0, 1]` or add up to
    /// more than 1.
    pub fn new(len: usize, train_fraction: f64, test_fraction: f64) -> Result<Self> {
        let valid = |f: f64| (0.0..=1.0).contains(&f);
        if !valid(train_fraction) || !valid(test_fraction) || train_fraction + test_fraction > 1.0
        {
            return Err(MlErr::InvalidConfig(format!(
                "split fractions {train_fraction} and {test_fraction} must lie in [0, 1] and add up to at most 1"
            )));
        }

        let n_train = ((len as f64 * train_fraction).floor() as usize).min(len);
        let n_test = ((len as f64 * test_fraction).ceil() as usize).min(len - n_train);

        Ok(Self {
            train: 0..n_train,
            test: n_train..n_train + n_test,
        })
    }

    pub fn train(&self) -> Range<usize> {
        self.train.clone()
    }

    pub fn test(&self) -> Range<usize> {
        self.test.clone()
    }

    /// Returns the amount of rows left out of both ranges.
    pub fn gap(&self, len: usize) -> usize {
        len.saturating_sub(self.test.end)
    }

    /// Applies the split to a dataset.
    ///
    /// # Returns
    /// The training and test subsets.
    pub fn subsets<'d, D: Dataset>(&self, dataset: &'d D) -> Result<(Subset<'d, D>, Subset<'d, D>)> {
        Ok((
            Subset::new(dataset, self.train())?,
            Subset::new(dataset, self.test())?,
        ))
    }
}
