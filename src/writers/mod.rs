pub mod figure_renderer;
pub mod npy_writer;
pub mod parquet_writer;
pub mod table_writer;

pub use figure_renderer::{FigureInput, FigureRenderer, ImageFormat};
pub use npy_writer::{encode_f64, write_npy};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use table_writer::{write_stability_csv, RunSummary};
