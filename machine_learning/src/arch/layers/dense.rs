use ndarray::{linalg, prelude::*};
use rand::Rng;

use crate::{
    MlErr, Result,
    arch::{Mode, activations::ActFn, init},
};

/// A fully connected layer, `act_fn(x · w + b)`.
///
/// Its parameters live outside of it: every call receives the layer's slice of the model's
/// flat parameter buffer, laid out as the `dim.0 × dim.1` weights followed by the `dim.1`
/// biases.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata, only recorded in training mode
    x: Option<Array2<f32>>,
    z: Option<Array2<f32>>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The amount of inputs and outputs of the layer.
    /// * `act_fn` - The activation applied to the output, if any.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
            act_fn,
            x: None,
            z: None,
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Draws a fresh set of parameters for this layer.
    ///
    /// Weights and biases both follow `U(-1/√fan_in, 1/√fan_in)`.
    pub fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f32>> {
        init::fan_in_uniform(rng, self.dim.0, self.size)
    }

    /// Makes a forward pass through the layer.
    ///
    /// In `Mode::Training` the input and pre-activation are kept for `backward`. In
    /// `Mode::Evaluating` nothing is recorded and whatever an earlier pass kept is dropped.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>, mode: Mode) -> Result<Array2<f32>> {
        let z = self.affine(params, x)?;
        let a = self.activate(&z);

        match mode {
            Mode::Training => {
                self.x = Some(x.to_owned());
                self.z = Some(z);
            }
            Mode::Evaluating => {
                self.x = None;
                self.z = None;
            }
        }

        Ok(a)
    }

    /// Makes a forward pass without recording anything.
    pub fn eval(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.affine(params, x)?;
        Ok(self.activate(&z))
    }

    /// Makes a backward pass through the layer, adding this batch's gradient into `grad`.
    ///
    /// # Arguments
    /// * `params` - The layer's parameters.
    /// * `grad` - The layer's gradient slice, accumulated into.
    /// * `d` - The derivative of the loss with respect to this layer's output.
    ///
    /// # Returns
    /// The derivative of the loss with respect to this layer's input.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        let Some(z_dim) = self.z.as_ref().map(|z| z.dim()) else {
            return Err(MlErr::MissingForward);
        };

        if d.dim() != z_dim {
            return Err(MlErr::SizeMismatch {
                what: "layer output derivative",
                got: d.len(),
                expected: z_dim.0 * z_dim.1,
            });
        }

        let (Some(x), Some(z)) = (self.x.take(), self.z.take()) else {
            return Err(MlErr::MissingForward);
        };

        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 1.0, &mut dw);
        db += &d.sum_axis(Axis(0));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    fn affine(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "layer input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = Array2::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut z);
        z += &b;

        Ok(z)
    }

    fn activate(&self, z: &Array2<f32>) -> Array2<f32> {
        match &self.act_fn {
            Some(act_fn) => z.mapv(|z| act_fn.f(z)),
            None => z.clone(),
        }
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    ///
    /// # Arguments
    /// * `grad` - A gradient slice.
    ///
    /// # Returns
    /// A tuple containing the delta weights and delta biases.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_len("layer gradient", grad.len())?;

        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| self.size_err(w_size))?;
        let db = ArrayViewMut1::from(db_raw);
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    ///
    /// # Arguments
    /// * `params` - A slice of parameters.
    ///
    /// # Returns
    /// A tuple containing the weights and biases.
    fn view_params<'a>(&self, params: &'a [f32]) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_len("layer parameters", params.len())?;

        let w_size = self.size - self.dim.1;
        let (w_raw, b_raw) = params.split_at(w_size);
        let weights = ArrayView2::from_shape(self.dim, w_raw).map_err(|_| self.size_err(w_size))?;
        let biases = ArrayView1::from(b_raw);
        Ok((weights, biases))
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.size {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected: self.size,
            });
        }

        Ok(())
    }

    fn size_err(&self, got: usize) -> MlErr {
        MlErr::SizeMismatch {
            what: "layer weights",
            got,
            expected: self.dim.0 * self.dim.1,
        }
    }
}
