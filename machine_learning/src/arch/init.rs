use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::Result;

/// Samples `n` values from `U(-1/√fan_in, 1/√fan_in)`, the usual default for linear layers.
///
/// # Arguments
/// * `rng` - A random number generator.
/// * `fan_in` - The number of input units of the layer.
/// * `n` - The amount of values to draw.
///
/// # Returns
/// An error if the calculated range is invalid (`fan_in` of zero).
pub fn fan_in_uniform<R: Rng + ?Sized>(rng: &mut R, fan_in: usize, n: usize) -> Result<Vec<f32>> {
    let bound = 1. / (fan_in as f32).sqrt();
    let distribution = Uniform::new_inclusive(-bound, bound)?;

    Ok((0..n).map(|_| distribution.sample(&mut *rng)).collect())
}
