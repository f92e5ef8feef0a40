use ndarray::{Array2, ArrayView2};

use crate::Result;

pub trait LossFn {
    /// Computes the loss of a prediction against the expected output.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<f32>;

    /// Computes the derivative of the loss with respect to every predicted value.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<Array2<f32>>;
}
