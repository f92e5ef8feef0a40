use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    MlErr, Result,
    dataset::{FitScope, SexEncoding},
    optimization::{Adam, GradientDescent, Optimizer},
};

const DEFAULT_EVAL_EVERY: NonZeroUsize = NonZeroUsize::new(5).unwrap();
const DEFAULT_WORKERS: NonZeroUsize = NonZeroUsize::new(4).unwrap();

/// The rows the categorical encoding is fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitScopeConfig {
    /// The whole file, test rows included.
    #[default]
    All,
    /// Only the training prefix.
    Training,
}

/// The configuration of the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerConfig {
    /// Missing hyperparameters take `Adam`'s usual values.
    Adam {
        learning_rate: f32,
        #[serde(default = "default_beta1")]
        beta1: f32,
        #[serde(default = "default_beta2")]
        beta2: f32,
        #[serde(default = "default_epsilon")]
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
}

fn default_beta1() -> f32 {
    Adam::DEFAULT_BETA1
}

fn default_beta2() -> f32 {
    Adam::DEFAULT_BETA2
}

fn default_epsilon() -> f32 {
    Adam::DEFAULT_EPSILON
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam {
            learning_rate: 0.1,
            beta1: Adam::DEFAULT_BETA1,
            beta2: Adam::DEFAULT_BETA2,
            epsilon: Adam::DEFAULT_EPSILON,
        }
    }
}

impl OptimizerConfig {
    pub fn learning_rate(&self) -> f32 {
        match *self {
            Self::Adam { learning_rate, .. } | Self::GradientDescent { learning_rate } => {
                learning_rate
            }
        }
    }

    /// Builds the optimizer for a model of `len` parameters.
    pub fn build(&self, len: usize) -> Box<dyn Optimizer> {
        match *self {
            Self::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => Box::new(Adam::new(len, learning_rate, beta1, beta2, epsilon)),
            Self::GradientDescent { learning_rate } => {
                Box::new(GradientDescent::new(learning_rate))
            }
        }
    }
}

/// Everything a training run needs to know. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
    pub encoding: SexEncoding,
    pub fit_scope: FitScopeConfig,
    pub train_fraction: f64,
    pub test_fraction: f64,
    pub hidden: usize,
    pub epochs: usize,
    pub eval_every: NonZeroUsize,
    /// `None` trains and evaluates on each whole partition at once.
    pub batch_size: Option<NonZeroUsize>,
    pub workers: NonZeroUsize,
    /// `None` seeds every rng from the OS.
    pub seed: Option<u64>,
    pub optimizer: OptimizerConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/abalone.data"),
            encoding: SexEncoding::default(),
            fit_scope: FitScopeConfig::default(),
            train_fraction: 0.8,
            test_fraction: 0.2,
            hidden: 4,
            epochs: 200,
            eval_every: DEFAULT_EVAL_EVERY,
            batch_size: None,
            workers: DEFAULT_WORKERS,
            seed: None,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Checks the values serde can't.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |f: f64| (0.0..=1.0).contains(&f);
        if !in_unit(self.train_fraction)
            || !in_unit(self.test_fraction)
            || self.train_fraction + self.test_fraction > 1.0
        {
            return Err(MlErr::InvalidConfig(format!(
                "train_fraction {} and test_fraction {} must lie in [0, 1] and add up to at most 1",
                self.train_fraction, self.test_fraction
            )));
        }

        if self.hidden == 0 {
            return Err(MlErr::InvalidConfig("hidden must be positive".into()));
        }

        let lr = self.optimizer.learning_rate();
        if !lr.is_finite() || lr <= 0. {
            return Err(MlErr::InvalidConfig(format!(
                "learning rate must be positive and finite, got {lr}"
            )));
        }

        Ok(())
    }

    /// Returns the rows the categorical encoding should be fitted on.
    pub fn fit_scope(&self) -> FitScope {
        match self.fit_scope {
            FitScopeConfig::All => FitScope::All,
            FitScopeConfig::Training => FitScope::Fraction(self.train_fraction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TrainingConfig::default();

        assert_eq!(config.epochs, 200);
        assert_eq!(config.eval_every.get(), 5);
        assert_eq!(config.workers.get(), 4);
        assert_eq!(config.hidden, 4);
        assert_eq!(config.batch_size, None);
        assert_eq!(config.optimizer.learning_rate(), 0.1);
        assert_eq!(config.fit_scope(), FitScope::All);
        config.validate().unwrap();
    }

    #[test]
    fn empty_json_is_the_default() {
        assert_eq!(TrainingConfig::from_json("{}").unwrap(), TrainingConfig::default());
    }

    #[test]
    fn partial_json_overrides() {
        let config = TrainingConfig::from_json(
            r#"{
                "encoding": "one_hot",
                "fit_scope": "training",
                "epochs": 10,
                "batch_size": 32,
                "seed": 7,
                "optimizer": { "gradient_descent": { "learning_rate": 0.01 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.encoding, SexEncoding::OneHot);
        assert_eq!(config.fit_scope(), FitScope::Fraction(0.8));
        assert_eq!(config.epochs, 10);
        assert_eq!(config.batch_size, NonZeroUsize::new(32));
        assert_eq!(config.seed, Some(7));
        assert_eq!(
            config.optimizer,
            OptimizerConfig::GradientDescent { learning_rate: 0.01 }
        );
    }

    #[test]
    fn adam_hyperparameters_default_individually() {
        let config = TrainingConfig::from_json(
            r#"{ "optimizer": { "adam": { "learning_rate": 0.01, "beta2": 0.99 } } }"#,
        )
        .unwrap();

        assert_eq!(
            config.optimizer,
            OptimizerConfig::Adam {
                learning_rate: 0.01,
                beta1: Adam::DEFAULT_BETA1,
                beta2: 0.99,
                epsilon: Adam::DEFAULT_EPSILON,
            }
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            TrainingConfig::from_json(r#"{ "train_fraction": 0.9, "test_fraction": 0.2 }"#),
            Err(MlErr::InvalidConfig(_))
        ));
        assert!(TrainingConfig::from_json(r#"{ "hidden": 0 }"#).is_err());
        assert!(TrainingConfig::from_json(r#"{ "eval_every": 0 }"#).is_err());
        assert!(matches!(
            TrainingConfig::from_json(r#"{ "epochs": "many" }"#),
            Err(MlErr::Config(_))
        ));
    }
}
