use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

use super::view::Dataset;
use crate::{MlErr, Result};

/// A group of samples materialized together for one forward (and backward) pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub x: Array2<f32>,
    pub y: Array2<f32>,
}

impl Batch {
    /// Returns the amount of samples in the batch.
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn views(&self) -> (ArrayView2<'_, f32>, ArrayView2<'_, f32>) {
        (self.x.view(), self.y.view())
    }
}

/// Produces batches over a dataset, one pass per `batches` call.
///
/// Rows of a batch are gathered on a dedicated pool of `workers` threads. The visiting order is
/// decided before gathering, so the pool never changes it.
pub struct DataLoader<'d, D: Dataset> {
    dataset: &'d D,
    batch_size: Option<NonZeroUsize>,
    shuffle: bool,
    order: Vec<usize>,
    rng: StdRng,
    pool: ThreadPool,
}

impl<'d, D: Dataset> DataLoader<'d, D> {
    /// Creates a new `DataLoader`.
    ///
    /// # Arguments
    /// * `dataset` - The dataset to batch.
    /// * `batch_size` - The amount of samples per batch, `None` for the whole dataset at once.
    /// * `shuffle` - Whether to draw a new permutation of the rows on every pass.
    /// * `workers` - The amount of threads gathering rows.
    /// * `seed` - The seed of the shuffling rng, `None` to seed it from the OS.
    ///
    /// # Returns
    /// The loader or an error if the worker pool can't be built.
    pub fn new(
        dataset: &'d D,
        batch_size: Option<NonZeroUsize>,
        shuffle: bool,
        workers: NonZeroUsize,
        seed: Option<u64>,
    ) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|i| format!("loader-{i}"))
            .build()
            .map_err(|e| MlErr::InvalidConfig(e.to_string()))?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            dataset,
            batch_size,
            shuffle,
            order: (0..dataset.len()).collect(),
            rng,
            pool,
        })
    }

    /// Returns the amount of samples per batch once resolved against the dataset's length.
    pub fn batch_size(&self) -> usize {
        match self.batch_size {
            Some(size) => size.get(),
            None => self.dataset.len().max(1),
        }
    }

    /// Returns the amount of batches a full pass yields.
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size())
    }

    /// Starts a new pass over the dataset.
    ///
    /// When shuffling, a fresh permutation is drawn on every call. Otherwise rows are visited in
    /// order, identically on every call.
    pub fn batches(&mut self) -> Batches<'_, 'd, D> {
        self.order.clear();
        self.order.extend(0..self.dataset.len());

        if self.shuffle {
            self.order.shuffle(&mut self.rng);
        }

        Batches {
            dataset: self.dataset,
            chunks: self.order.chunks(self.batch_size()),
            pool: &self.pool,
        }
    }
}

/// A single pass over a `DataLoader`'s dataset.
pub struct Batches<'l, 'd, D: Dataset> {
    dataset: &'d D,
    chunks: std::slice::Chunks<'l, usize>,
    pool: &'l ThreadPool,
}

impl<D: Dataset> Batches<'_, '_, D> {
    fn gather(&self, indices: &[usize]) -> Result<Batch> {
        let samples = self.pool.install(|| {
            indices
                .par_iter()
                .map(|&i| self.dataset.get(i))
                .collect::<Result<Vec<_>>>()
        })?;

        let (x_width, y_width) = (self.dataset.feature_width(), self.dataset.label_width());
        let mut x = Array2::zeros((samples.len(), x_width));
        let mut y = Array2::zeros((samples.len(), y_width));

        for (i, (xs, ys)) in samples.into_iter().enumerate() {
            x.row_mut(i).assign(&xs);
            y.row_mut(i).assign(&ys);
        }

        Ok(Batch { x, y })
    }
}

impl<D: Dataset> Iterator for Batches<'_, '_, D> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.chunks.next()?;
        Some(self.gather(indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::view::Sample;
    use ndarray::Array1;

    /// Sample `i` is `([i, -i], [10 * i])`.
    struct Ramp(usize);

    impl Dataset for Ramp {
        fn len(&self) -> usize {
            self.0
        }

        fn get(&self, index: usize) -> Result<Sample> {
            if index >= self.0 {
                return Err(MlErr::IndexOutOfBounds {
                    index,
                    len: self.0,
                });
            }

            let i = index as f32;
            Ok((Array1::from(vec![i, -i]), Array1::from(vec![10. * i])))
        }

        fn feature_width(&self) -> usize {
            2
        }

        fn label_width(&self) -> usize {
            1
        }
    }

    fn workers() -> NonZeroUsize {
        NonZeroUsize::new(4).unwrap()
    }

    fn first_column(batches: Batches<'_, '_, Ramp>) -> Vec<f32> {
        batches
            .map(|batch| batch.unwrap())
            .flat_map(|batch| batch.x.column(0).to_vec())
            .collect()
    }

    #[test]
    fn whole_dataset_in_a_single_batch_by_default() {
        let ds = Ramp(10);
        let mut loader = DataLoader::new(&ds, None, false, workers(), Some(0)).unwrap();

        let batches: Vec<_> = loader.batches().collect::<Result<_>>().unwrap();
        assert_eq!(loader.num_batches(), 1);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].x.shape(), &[10, 2]);
        assert_eq!(batches[0].y.shape(), &[10, 1]);
    }

    #[test]
    fn rows_keep_features_and_labels_together() {
        let ds = Ramp(7);
        let mut loader = DataLoader::new(&ds, None, true, workers(), Some(3)).unwrap();

        let batch = loader.batches().next().unwrap().unwrap();
        for (x, y) in batch.x.rows().into_iter().zip(batch.y.rows()) {
            assert_eq!(x[1], -x[0]);
            assert_eq!(y[0], 10. * x[0]);
        }
    }

    #[test]
    fn unshuffled_order_is_identical_across_passes() {
        let ds = Ramp(25);
        let size = NonZeroUsize::new(4);
        let mut loader = DataLoader::new(&ds, size, false, workers(), Some(0)).unwrap();

        let first = first_column(loader.batches());
        let second = first_column(loader.batches());

        assert_eq!(first, second);
        assert_eq!(first, (0..25).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn shuffled_order_changes_across_passes() {
        let ds = Ramp(50);
        let mut loader = DataLoader::new(&ds, None, true, workers(), Some(7)).unwrap();

        let first = first_column(loader.batches());
        let second = first_column(loader.batches());

        assert_ne!(first, second);
    }

    #[test]
    fn every_row_exactly_once_per_pass() {
        let ds = Ramp(23);
        let size = NonZeroUsize::new(5);
        let mut loader = DataLoader::new(&ds, size, true, workers(), Some(11)).unwrap();

        assert_eq!(loader.num_batches(), 5);

        let lens: Vec<_> = loader.batches().map(|b| b.unwrap().len()).collect();
        assert_eq!(lens, [5, 5, 5, 5, 3]);

        let mut seen = first_column(loader.batches());
        seen.sort_by(f32::total_cmp);
        assert_eq!(seen, (0..23).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn empty_dataset_yields_no_batches() {
        let ds = Ramp(0);
        let mut loader = DataLoader::new(&ds, None, true, workers(), Some(0)).unwrap();
        assert_eq!(loader.batches().count(), 0);
    }
}
