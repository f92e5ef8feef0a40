use ndarray::{Array2, ArrayView2};

use super::{Mode, layers::Dense, params::ParamStore};
use crate::{MlErr, Result};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Dense>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Dense>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Dense::size).sum()
    }

    /// Returns the amount of parameters of each layer, in order.
    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(Dense::size).collect()
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `x` - The input data, one sample per row.
    /// * `mode` - Whether the layers should record what the backward pass needs.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn forward(
        &mut self,
        params: &ParamStore,
        x: ArrayView2<f32>,
        mode: Mode,
    ) -> Result<Array2<f32>> {
        self.check_layers(params)?;

        let mut out: Option<Array2<f32>> = None;
        for (layer, layer_params) in self.layers.iter_mut().zip(params.front()) {
            let input = out.as_ref().map_or(x, |a| a.view());
            out = Some(layer.forward(layer_params, input, mode)?);
        }

        Ok(out.unwrap_or_else(|| x.to_owned()))
    }

    /// Makes a forward pass through the network without recording anything.
    pub fn eval(&self, params: &ParamStore, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_layers(params)?;

        let mut out: Option<Array2<f32>> = None;
        for (layer, layer_params) in self.layers.iter().zip(params.front()) {
            let input = out.as_ref().map_or(x, |a| a.view());
            out = Some(layer.eval(layer_params, input)?);
        }

        Ok(out.unwrap_or_else(|| x.to_owned()))
    }

    /// Makes a backward pass through the network, accumulating into the gradient of `params`.
    ///
    /// # Arguments
    /// * `params` - The model's parameters and gradient.
    /// * `d` - The derivative of the loss with respect to the model's output.
    pub fn backward(&mut self, params: &mut ParamStore, mut d: Array2<f32>) -> Result<()> {
        self.check_layers(params)?;

        for (layer, (layer_params, layer_grad)) in self.layers.iter_mut().rev().zip(params.back()) {
            d = layer.backward(layer_params, layer_grad, d)?;
        }

        Ok(())
    }

    fn check_layers(&self, params: &ParamStore) -> Result<()> {
        let expected = self.size();
        if params.len() != expected {
            return Err(MlErr::SizeMismatch {
                what: "model parameters",
                got: params.len(),
                expected,
            });
        }

        Ok(())
    }
}
