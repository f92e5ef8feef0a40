use std::mem;

use crate::{MlErr, Result, optimization::Optimizer};

/// The flat parameter and gradient buffers of a model, split into one slice per layer.
///
/// Layers are traversed forwards with `front` for forward passes and backwards with `back`
/// for backward passes.
#[derive(Debug, Clone)]
pub struct ParamStore {
    params: Vec<f32>,
    grad: Vec<f32>,
    layer_sizes: Vec<usize>,
}

impl ParamStore {
    /// Creates a new `ParamStore`.
    ///
    /// # Arguments
    /// * `params` - The initial parameters of every layer, concatenated in layer order.
    /// * `layer_sizes` - The amount of parameters of each layer.
    ///
    /// # Returns
    /// A new `ParamStore` or `MlErr::SizeMismatch` if the sizes don't add up to the amount of
    /// parameters.
    pub fn new(params: Vec<f32>, layer_sizes: Vec<usize>) -> Result<Self> {
        let expected = layer_sizes.iter().sum();
        if params.len() != expected {
            return Err(MlErr::SizeMismatch {
                what: "parameters",
                got: params.len(),
                expected,
            });
        }

        Ok(Self {
            grad: vec![0.; params.len()],
            params,
            layer_sizes,
        })
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the parameters of the `i`-th layer.
    pub fn layer(&self, i: usize) -> Option<&[f32]> {
        self.front().nth(i)
    }

    /// Creates a new `FrontIter` parameter iterator.
    ///
    /// The returned iterator iterates the model's layers forward.
    pub fn front(&self) -> FrontIter<'_> {
        FrontIter {
            params: &self.params,
            layer_sizes: &self.layer_sizes,
        }
    }

    /// Creates a new `BackIter` parameter iterator.
    ///
    /// The returned iterator iterates the model's layers backwards.
    pub fn back(&mut self) -> BackIter<'_> {
        BackIter {
            params: &self.params,
            grad: &mut self.grad,
            layer_sizes: &self.layer_sizes,
        }
    }

    /// Applies the gradient onto the parameters.
    pub fn optimize<O: Optimizer + ?Sized>(&mut self, optimizer: &mut O) -> Result<()> {
        optimizer.update_params(&mut self.params, &self.grad)
    }

    /// Zeros out the gradient.
    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }
}

/// A model's layer iterator.
///
/// This iterator iterates the layers of a model from the front.
pub struct FrontIter<'p> {
    params: &'p [f32],
    layer_sizes: &'p [usize],
}

impl<'p> Iterator for FrontIter<'p> {
    type Item = &'p [f32];

    fn next(&mut self) -> Option<Self::Item> {
        let (&size, rest) = self.layer_sizes.split_first()?;
        let (layer, params) = self.params.split_at(size);

        self.layer_sizes = rest;
        self.params = params;
        Some(layer)
    }
}

/// A model's layer iterator.
///
/// This iterator iterates the layers of a model from the back, yielding each layer's
/// parameters and gradient.
pub struct BackIter<'p> {
    params: &'p [f32],
    grad: &'p mut [f32],
    layer_sizes: &'p [usize],
}

impl<'p> Iterator for BackIter<'p> {
    type Item = (&'p [f32], &'p mut [f32]);

    fn next(&mut self) -> Option<Self::Item> {
        let (&size, rest) = self.layer_sizes.split_last()?;
        let mid = self.params.len() - size;

        let (params, layer_params) = self.params.split_at(mid);
        let (grad, layer_grad) = mem::take(&mut self.grad).split_at_mut(mid);

        self.layer_sizes = rest;
        self.params = params;
        self.grad = grad;
        Some((layer_params, layer_grad))
    }
}
