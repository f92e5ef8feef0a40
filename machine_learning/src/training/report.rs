use std::fmt;

use crate::arch::Mode;

/// The outcome of a single pass over a partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    epoch: usize,
    mode: Mode,
    total_loss: f32,
    batches: usize,
    samples: usize,
}

impl EpochReport {
    /// Creates an empty report for the given epoch.
    pub fn new(epoch: usize, mode: Mode) -> Self {
        Self {
            epoch,
            mode,
            total_loss: 0.,
            batches: 0,
            samples: 0,
        }
    }

    /// Accounts for one more batch.
    ///
    /// # Arguments
    /// * `loss` - The mean loss of the batch.
    /// * `samples` - The amount of samples in the batch.
    pub fn record(&mut self, loss: f32, samples: usize) {
        self.total_loss += loss;
        self.batches += 1;
        self.samples += samples;
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the mean of the batch losses recorded so far.
    ///
    /// `NaN` if no batch was recorded.
    pub fn loss(&self) -> f32 {
        self.total_loss / self.batches as f32
    }

    /// Renders the per-batch progress line, carrying the running loss.
    ///
    /// # Arguments
    /// * `batch` - The index of the batch just recorded.
    pub fn progress(&self, batch: usize) -> String {
        format!(
            "epoch {} {} batch {batch}: running loss {:.6} ({} samples)",
            self.epoch,
            mode_name(self.mode),
            self.loss(),
            self.samples
        )
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epoch {:>4} {:<5} loss {:.6} ({} samples in {} batches)",
            self.epoch,
            mode_name(self.mode),
            self.loss(),
            self.samples,
            self.batches
        )
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Training => "train",
        Mode::Evaluating => "eval",
    }
}

/// Every report of a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSummary {
    pub train: Vec<EpochReport>,
    pub eval: Vec<EpochReport>,
}

impl TrainingSummary {
    /// Returns the training loss of the last epoch.
    pub fn final_train_loss(&self) -> Option<f32> {
        self.train.last().map(EpochReport::loss)
    }

    /// Returns the loss of the last evaluation.
    pub fn final_eval_loss(&self) -> Option<f32> {
        self.eval.last().map(EpochReport::loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_is_the_mean_over_batches() {
        let mut report = EpochReport::new(3, Mode::Training);
        report.record(2., 10);
        report.record(4., 5);

        assert_eq!(report.loss(), 3.);
        assert_eq!(report.batches(), 2);
        assert_eq!(report.samples(), 15);
    }

    #[test]
    fn empty_report_has_nan_loss() {
        assert!(EpochReport::new(0, Mode::Evaluating).loss().is_nan());
    }

    #[test]
    fn progress_line_carries_the_running_loss() {
        let mut report = EpochReport::new(7, Mode::Training);
        report.record(2.5, 8);
        assert_eq!(
            report.progress(0),
            "epoch 7 train batch 0: running loss 2.500000 (8 samples)"
        );

        report.record(0.5, 8);
        assert!(report.progress(1).contains("running loss 1.500000"));
    }

    #[test]
    fn display() {
        let mut report = EpochReport::new(5, Mode::Evaluating);
        report.record(1.5, 836);

        assert_eq!(
            report.to_string(),
            "epoch    5 eval  loss 1.500000 (836 samples in 1 batches)"
        );
    }
}
