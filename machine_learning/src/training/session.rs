use log::debug;
use rand::{SeedableRng, rngs::StdRng};

use super::EpochReport;
use crate::{
    MlErr, Result,
    arch::{
        Mode, Predictor,
        loss::{LossFn, Mse},
    },
    config::TrainingConfig,
    dataset::{DataLoader, Dataset},
    optimization::Optimizer,
};

/// All the mutable state of a training run: the predictor, its optimizer and the loaders over
/// both partitions.
///
/// Parameters are only ever written by `run_training_epoch`.
pub struct Session<'d, D: Dataset, L: LossFn = Mse> {
    predictor: Predictor,
    optimizer: Box<dyn Optimizer>,
    loss_fn: L,
    train: DataLoader<'d, D>,
    test: DataLoader<'d, D>,
}

impl<'d, D: Dataset, L: LossFn> Session<'d, D, L> {
    /// Creates a new `Session`.
    ///
    /// # Arguments
    /// * `predictor` - The network to train.
    /// * `optimizer` - The optimizer applying the gradient onto the predictor's parameters.
    /// * `loss_fn` - The loss function.
    /// * `train` - The loader over the training partition.
    /// * `test` - The loader over the test partition.
    pub fn new(
        predictor: Predictor,
        optimizer: Box<dyn Optimizer>,
        loss_fn: L,
        train: DataLoader<'d, D>,
        test: DataLoader<'d, D>,
    ) -> Self {
        Self {
            predictor,
            optimizer,
            loss_fn,
            train,
            test,
        }
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// Runs one pass over the training partition, making one optimizer step per batch.
    ///
    /// # Arguments
    /// * `epoch` - The epoch number, only used for reporting.
    pub fn run_training_epoch(&mut self, epoch: usize) -> Result<EpochReport> {
        let mut report = EpochReport::new(epoch, Mode::Training);

        for (i, batch) in self.train.batches().enumerate() {
            let batch = batch?;
            let (x, y) = batch.views();

            self.predictor.zero_grad();
            let y_pred = self.predictor.forward(x, Mode::Training)?;
            let loss = self.loss_fn.loss(y_pred.view(), y)?;
            let d = self.loss_fn.loss_prime(y_pred.view(), y)?;
            self.predictor.backward(d)?;
            self.predictor.step(&mut *self.optimizer)?;

            report.record(loss, batch.len());
            debug!(epoch = epoch, batch = i; "{}", report.progress(i));
        }

        Ok(report)
    }

    /// Runs one pass over the test partition without touching the parameters.
    ///
    /// # Arguments
    /// * `epoch` - The epoch number, only used for reporting.
    pub fn run_evaluation_epoch(&mut self, epoch: usize) -> Result<EpochReport> {
        let mut report = EpochReport::new(epoch, Mode::Evaluating);

        for (i, batch) in self.test.batches().enumerate() {
            let batch = batch?;
            let (x, y) = batch.views();

            let y_pred = self.predictor.forward(x, Mode::Evaluating)?;
            let loss = self.loss_fn.loss(y_pred.view(), y)?;

            report.record(loss, batch.len());
            debug!(epoch = epoch, batch = i; "{}", report.progress(i));
        }

        Ok(report)
    }
}

impl<'d, D: Dataset> Session<'d, D, Mse> {
    /// Builds a session out of a configuration and the two partitions.
    ///
    /// With a seed every rng is derived from it, making the whole run reproducible.
    pub fn from_config(config: &TrainingConfig, train: &'d D, test: &'d D) -> Result<Self> {
        if train.label_width() != 1 {
            return Err(MlErr::SizeMismatch {
                what: "labels per sample",
                got: train.label_width(),
                expected: 1,
            });
        }

        let (mut init_rng, train_seed, test_seed) = match config.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                Some(seed.wrapping_add(1)),
                Some(seed.wrapping_add(2)),
            ),
            None => (StdRng::from_os_rng(), None, None),
        };

        let predictor = Predictor::new(train.feature_width(), config.hidden, &mut init_rng)?;
        let optimizer = config.optimizer.build(predictor.size());

        let train = DataLoader::new(train, config.batch_size, true, config.workers, train_seed)?;
        let test = DataLoader::new(test, config.batch_size, false, config.workers, test_seed)?;

        Ok(Self::new(predictor, optimizer, Mse::new(), train, test))
    }
}
