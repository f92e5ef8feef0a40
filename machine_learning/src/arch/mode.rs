/// The mode a forward pass runs in.
///
/// It is passed explicitly on every call, layers keep no mode of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Layers keep what their backward pass needs.
    Training,
    /// No-gradient pass: nothing is recorded.
    Evaluating,
}
