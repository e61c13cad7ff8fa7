pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::{export_tables, render_figure, run, Analysis, ExportReport};
