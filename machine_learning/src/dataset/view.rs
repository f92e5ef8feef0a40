use std::ops::Range;

use ndarray::Array1;

use super::row_store::RowStore;
use crate::{MlErr, Result};

/// A `(features, label)` pair.
pub type Sample = (Array1<f32>, Array1<f32>);

/// A randomly indexable collection of samples.
///
/// A `Dataset` only provides access to samples, it does not decide how they are batched or
/// in which order they are visited.
pub trait Dataset: Sync {
    /// Returns the amount of samples.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetches a sample by position.
    ///
    /// # Errors
    /// `MlErr::IndexOutOfBounds` if `index` is not in `[0, len)`.
    fn get(&self, index: usize) -> Result<Sample>;

    /// Returns the amount of features of every sample.
    fn feature_width(&self) -> usize;

    /// Returns the amount of labels of every sample.
    fn label_width(&self) -> usize;
}

/// A read-only projection of a `RowStore` into feature and label columns.
#[derive(Debug, Clone)]
pub struct IndexedDataset<'a> {
    store: &'a RowStore,
    features: Vec<usize>,
    labels: Vec<usize>,
}

impl<'a> IndexedDataset<'a> {
    /// The column used as label by `abalone`.
    pub const LABEL: &'static str = "rings";

    /// Creates a new `IndexedDataset`.
    ///
    /// # Arguments
    /// * `store` - The store to project.
    /// * `features` - The names of the feature columns, in order.
    /// * `labels` - The names of the label columns, in order.
    ///
    /// # Returns
    /// The view or `MlErr::UnknownColumn` if a name isn't in the store.
    pub fn new(store: &'a RowStore, features: &[&str], labels: &[&str]) -> Result<Self> {
        let resolve = |names: &[&str]| {
            names
                .iter()
                .map(|name| store.column_index(name))
                .collect::<Result<Vec<_>>>()
        };

        Ok(Self {
            features: resolve(features)?,
            labels: resolve(labels)?,
            store,
        })
    }

    /// Creates the abalone view: every column but `rings` as features, `rings` as label.
    pub fn abalone(store: &'a RowStore) -> Result<Self> {
        let features: Vec<&str> = store
            .column_names()
            .iter()
            .map(String::as_str)
            .filter(|&name| name != Self::LABEL)
            .collect();

        Self::new(store, &features, &[Self::LABEL])
    }
}

impl Dataset for IndexedDataset<'_> {
    fn len(&self) -> usize {
        self.store.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let row = self.store.row(index).ok_or(MlErr::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;

        let x = self.features.iter().map(|&c| row[c]).collect();
        let y = self.labels.iter().map(|&c| row[c]).collect();
        Ok((x, y))
    }

    fn feature_width(&self) -> usize {
        self.features.len()
    }

    fn label_width(&self) -> usize {
        self.labels.len()
    }
}

/// A contiguous range of another dataset, re-indexed from zero.
#[derive(Debug, Clone)]
pub struct Subset<'d, D: Dataset> {
    inner: &'d D,
    range: Range<usize>,
}

impl<'d, D: Dataset> Subset<'d, D> {
    /// Creates a new `Subset`.
    ///
    /// # Returns
    /// `MlErr::IndexOutOfBounds` if the range runs past the end of `inner`.
    pub fn new(inner: &'d D, range: Range<usize>) -> Result<Self> {
        if range.end > inner.len() || range.start > range.end {
            return Err(MlErr::IndexOutOfBounds {
                index: range.end,
                len: inner.len(),
            });
        }

        Ok(Self { inner, range })
    }
}

impl<D: Dataset> Dataset for Subset<'_, D> {
    fn len(&self) -> usize {
        self.range.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        if index >= self.len() {
            return Err(MlErr::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }

        self.inner.get(self.range.start + index)
    }

    fn feature_width(&self) -> usize {
        self.inner.feature_width()
    }

    fn label_width(&self) -> usize {
        self.inner.label_width()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::dataset::{
        encoding::{FitScope, SexEncoding},
        record::ABALONE_COLUMNS,
    };

    const SAMPLE: &str = "\
M 0.455 0.365 0.095 0.514 0.2245 0.101 0.15 15
F 0.53 0.42 0.135 0.677 0.2565 0.1415 0.21 9
I 0.33 0.255 0.08 0.205 0.0895 0.0395 0.055 7
";

    fn store(encoding: SexEncoding) -> RowStore {
        RowStore::from_reader(Cursor::new(SAMPLE), &ABALONE_COLUMNS, encoding, FitScope::All)
            .unwrap()
    }

    #[test]
    fn every_sample_has_eight_features_and_one_label() {
        let store = store(SexEncoding::Indicator);
        let view = IndexedDataset::abalone(&store).unwrap();

        assert_eq!(view.len(), 3);
        for i in 0..view.len() {
            let (x, y) = view.get(i).unwrap();
            assert_eq!(x.len(), 8);
            assert_eq!(y.len(), 1);
        }
    }

    #[test]
    fn features_follow_column_order() {
        let store = store(SexEncoding::Indicator);
        let view = IndexedDataset::abalone(&store).unwrap();

        let (x, y) = view.get(1).unwrap();
        assert_eq!(x.to_vec(), [1., 0.53, 0.42, 0.135, 0.677, 0.2565, 0.1415, 0.21]);
        assert_eq!(y.to_vec(), [9.]);
    }

    #[test]
    fn one_hot_view_has_ten_features() {
        let store = store(SexEncoding::OneHot);
        let view = IndexedDataset::abalone(&store).unwrap();

        assert_eq!(view.feature_width(), 10);
        assert_eq!(view.get(2).unwrap().0.to_vec()[..3], [0., 1., 0.]);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let store = store(SexEncoding::Indicator);
        let view = IndexedDataset::abalone(&store).unwrap();

        assert!(matches!(
            view.get(3),
            Err(MlErr::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn returned_samples_do_not_alias() {
        let store = store(SexEncoding::Indicator);
        let view = IndexedDataset::abalone(&store).unwrap();

        let (mut first, _) = view.get(0).unwrap();
        first.fill(-1.);

        let (second, _) = view.get(0).unwrap();
        assert_eq!(second[1], 0.455);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let store = store(SexEncoding::Indicator);
        let err = IndexedDataset::new(&store, &["length", "age"], &["rings"]).unwrap_err();
        assert!(matches!(err, MlErr::UnknownColumn(name) if name == "age"));
    }

    #[test]
    fn subset_reindexes_from_zero() {
        let store = store(SexEncoding::Indicator);
        let view = IndexedDataset::abalone(&store).unwrap();
        let subset = Subset::new(&view, 1..3).unwrap();

        assert_eq!(subset.len(), 2);
        assert_eq!(subset.get(0).unwrap().1.to_vec(), [9.]);
        assert!(subset.get(2).is_err());
        assert!(Subset::new(&view, 2..4).is_err());
    }
}
