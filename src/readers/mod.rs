pub mod dataset_loader;
pub mod npy_reader;
pub mod spatial_reader;

pub use dataset_loader::{DataLoader, InventoryReport, SpatialDataset, TemporalDataset};
pub use npy_reader::{NpyArray, NpyReader};
pub use spatial_reader::SpatialReader;
