use ndarray::{Array2, ArrayView2};

use super::LossFn;
use crate::{MlErr, Result};

/// Mean squared error loss function.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }

    fn check_shapes(y_pred: &ArrayView2<f32>, y: &ArrayView2<f32>) -> Result<()> {
        if y_pred.dim() != y.dim() {
            return Err(MlErr::SizeMismatch {
                what: "prediction and labels",
                got: y_pred.len(),
                expected: y.len(),
            });
        }

        Ok(())
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<f32> {
        Self::check_shapes(&y_pred, &y)?;

        let loss = (&y_pred - &y)
            .mapv(|x| x.powi(2))
            .mean()
            .unwrap_or_default();

        Ok(loss)
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<Array2<f32>> {
        Self::check_shapes(&y_pred, &y)?;
        Ok((&y_pred - &y) * (2.0 / y_pred.len() as f32))
    }
}
