pub mod activations;
pub mod init;
pub mod layers;
pub mod loss;
mod mode;
mod params;
mod predictor;
mod sequential;

pub use mode::Mode;
pub use params::{BackIter, FrontIter, ParamStore};
pub use predictor::Predictor;
pub use sequential::Sequential;
