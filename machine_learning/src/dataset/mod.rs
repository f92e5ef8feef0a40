mod encoding;
mod loader;
mod record;
mod row_store;
mod split;
mod view;

pub use encoding::{FitScope, SexEncoder, SexEncoding};
pub use loader::{Batch, Batches, DataLoader};
pub use record::{ABALONE_COLUMNS, NUM_FIELDS, NUM_MEASUREMENTS, Record, Sex};
pub use row_store::RowStore;
pub use split::Split;
pub use view::{Dataset, IndexedDataset, Sample, Subset};
