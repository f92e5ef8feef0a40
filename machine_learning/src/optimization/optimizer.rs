use crate::Result;

/// An optimization algorithm: decides how parameters move given their gradient.
pub trait Optimizer {
    /// Updates the parameters following the algorithm's learning rule.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The gradient used for taking the step.
    ///
    /// # Returns
    /// `MlErr::SizeMismatch` if `params` and `grad` differ in length, or if they don't match the
    /// amount of parameters the optimizer was built for.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()>;
}

/// Checks that a gradient lines up with the parameters it updates.
pub(super) fn check_lens(params: &[f32], grad: &[f32]) -> Result<()> {
    if params.len() != grad.len() {
        return Err(crate::MlErr::SizeMismatch {
            what: "gradient",
            got: grad.len(),
            expected: params.len(),
        });
    }

    Ok(())
}
