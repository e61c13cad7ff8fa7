pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use filename::{
    curve_file_name, default_export_dir, default_figure_path, difference_file_name, year_file_name,
};
pub use logging::init_logging;
pub use progress::ProgressReporter;
