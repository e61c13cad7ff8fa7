use crate::models::{CurveKey, IntensityBucket, Statistic};
use crate::utils::constants::{
    CURVE_FILE_EXTENSION, DEFAULT_FIGURES_DIR, DEFAULT_FIGURE_NAME, SPATIAL_FILE_PREFIX,
};
use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Curve file name with format: {region}_{intensity}_{stat}.npy
pub fn curve_file_name(key: &CurveKey) -> String {
    format!(
        "{}_{}_{}.{}",
        key.region.file_token(),
        key.intensity.file_token(),
        key.statistic.file_token(),
        CURVE_FILE_EXTENSION
    )
}

/// Spatial file name with format: spa_{year}.txt
pub fn year_file_name(year: u16) -> String {
    format!("{}{}.txt", SPATIAL_FILE_PREFIX, year)
}

/// Exported difference index curve with format: di_{intensity}_{stat}.npy
pub fn difference_file_name(intensity: IntensityBucket, statistic: Statistic) -> String {
    format!(
        "di_{}_{}.{}",
        intensity.file_token(),
        statistic.file_token(),
        CURVE_FILE_EXTENSION
    )
}

/// Default composite figure path: figures/figure1_composite.png
pub fn default_figure_path() -> PathBuf {
    PathBuf::from(DEFAULT_FIGURES_DIR).join(DEFAULT_FIGURE_NAME)
}

/// Default export directory with format: figures/export-{YYMMDD}
pub fn default_export_dir(figures_dir: &Path) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year

    figures_dir.join(format!(
        "export-{:02}{:02}{:02}",
        year,
        now.month(),
        now.day()
    ))
}
