use std::num::NonZeroUsize;

use log::info;

use super::{Session, TrainingSummary};
use crate::{Result, arch::loss::LossFn, config::TrainingConfig, dataset::Dataset};

/// Drives a `Session` through a fixed amount of epochs, evaluating periodically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trainer {
    epochs: usize,
    eval_every: NonZeroUsize,
}

impl Trainer {
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `epochs` - The amount of training epochs.
    /// * `eval_every` - Evaluation runs on every epoch that is a multiple of it, epoch 0 included.
    pub fn new(epochs: usize, eval_every: NonZeroUsize) -> Self {
        Self { epochs, eval_every }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self::new(config.epochs, config.eval_every)
    }

    /// Whether `epoch` is followed by an evaluation.
    pub fn evaluates_on(&self, epoch: usize) -> bool {
        epoch % self.eval_every.get() == 0
    }

    /// Runs the whole loop, aborting on the first error.
    ///
    /// # Returns
    /// Every training and evaluation report, in order.
    pub fn run<D: Dataset, L: LossFn>(
        &self,
        session: &mut Session<'_, D, L>,
    ) -> Result<TrainingSummary> {
        info!(
            "starting training for {} epochs, evaluating every {}",
            self.epochs, self.eval_every
        );

        let mut summary = TrainingSummary::default();
        for epoch in 0..self.epochs {
            let report = session.run_training_epoch(epoch)?;
            info!("{report}");
            summary.train.push(report);

            if self.evaluates_on(epoch) {
                let report = session.run_evaluation_epoch(epoch)?;
                info!("{report}");
                summary.eval.push(report);
            }
        }

        info!(
            "training finished, train loss {:.6}, eval loss {:.6}",
            summary.final_train_loss().unwrap_or(f32::NAN),
            summary.final_eval_loss().unwrap_or(f32::NAN)
        );

        Ok(summary)
    }
}
