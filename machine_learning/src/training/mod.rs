mod report;
mod session;
mod trainer;

pub use report::{EpochReport, TrainingSummary};
pub use session::Session;
pub use trainer::Trainer;
