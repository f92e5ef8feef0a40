use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;

use super::{Mode, Sequential, activations::ActFn, layers::Dense, params::ParamStore};
use crate::{MlErr, Result, optimization::Optimizer};

/// The regression network, `linear(input → hidden) → relu → linear(hidden → 1)`, together with
/// its parameters.
///
/// Parameters only change through `step`.
#[derive(Clone, Debug)]
pub struct Predictor {
    model: Sequential,
    params: ParamStore,
}

impl Predictor {
    /// Creates a new `Predictor` with randomly initialized parameters.
    ///
    /// # Arguments
    /// * `input` - The amount of features per sample.
    /// * `hidden` - The width of the hidden layer.
    /// * `rng` - The random number generator the parameters are drawn from.
    pub fn new<R: Rng + ?Sized>(input: usize, hidden: usize, rng: &mut R) -> Result<Self> {
        let model = Self::architecture(input, hidden);

        let mut params = Vec::with_capacity(model.size());
        for layer in model.layers() {
            params.extend(layer.init_params(rng)?);
        }

        debug!("initialized {} parameters for a {input}-{hidden}-1 network", params.len());
        Self::with_params(input, hidden, params)
    }

    /// Creates a new `Predictor` with the given parameters.
    ///
    /// # Arguments
    /// * `input` - The amount of features per sample.
    /// * `hidden` - The width of the hidden layer.
    /// * `params` - `w1` (`input × hidden`, row major), `b1`, `w2` (`hidden × 1`) and `b2`,
    ///   concatenated.
    pub fn with_params(input: usize, hidden: usize, params: Vec<f32>) -> Result<Self> {
        let model = Self::architecture(input, hidden);
        let params = ParamStore::new(params, model.layer_sizes())?;
        Ok(Self { model, params })
    }

    fn architecture(input: usize, hidden: usize) -> Sequential {
        Sequential::new([
            Dense::new((input, hidden), Some(ActFn::relu())),
            Dense::new((hidden, 1), None),
        ])
    }

    /// Returns the amount of features the predictor expects.
    pub fn input_width(&self) -> usize {
        self.model.layers()[0].dim().0
    }

    /// Makes a forward pass over a batch, one sample per row.
    pub fn forward(&mut self, x: ArrayView2<f32>, mode: Mode) -> Result<Array2<f32>> {
        self.model.forward(&self.params, x, mode)
    }

    /// Predicts the output for a single feature vector.
    ///
    /// Runs in evaluating mode: deterministic and free of side effects.
    pub fn predict(&self, features: ArrayView1<f32>) -> Result<f32> {
        let x = features.insert_axis(Axis(0));
        let y = self.model.eval(&self.params, x)?;

        y.get((0, 0)).copied().ok_or(MlErr::SizeMismatch {
            what: "prediction",
            got: 0,
            expected: 1,
        })
    }

    /// Accumulates the gradient of the loss given its derivative with respect to the output of
    /// the last training-mode `forward`.
    pub fn backward(&mut self, d: Array2<f32>) -> Result<()> {
        self.model.backward(&mut self.params, d)
    }

    /// Clears the accumulated gradient.
    pub fn zero_grad(&mut self) {
        self.params.zero_grad();
    }

    /// Applies one optimizer update using the accumulated gradient.
    pub fn step<O: Optimizer + ?Sized>(&mut self, optimizer: &mut O) -> Result<()> {
        self.params.optimize(optimizer)
    }

    pub fn params(&self) -> &[f32] {
        self.params.params()
    }

    pub fn grad(&self) -> &[f32] {
        self.params.grad()
    }

    /// Returns the parameters of the `i`-th dense layer, weights then biases.
    pub fn layer_params(&self, i: usize) -> Option<&[f32]> {
        self.params.layer(i)
    }

    /// Returns the total amount of parameters.
    pub fn size(&self) -> usize {
        self.params.len()
    }
}
