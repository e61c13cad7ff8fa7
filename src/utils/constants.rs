use std::ops::Range;

/// Temporal curve layout (interpolated midday-to-sunset axis)
pub const CURVE_LENGTH: usize = 1000;
pub const MIDDAY_INDEX: usize = 143;
pub const SUNSET_INDEX: usize = 856;
pub const MIDDAY_PEAK_WINDOW: Range<usize> = 400..500;

/// Spatial year files
pub const FIRST_YEAR: u16 = 2001;
pub const LAST_YEAR: u16 = 2020;
pub const DEFAULT_YEAR: u16 = 2020;
pub const SPATIAL_COLUMNS: usize = 3;

/// Difference index thresholds (fraction, 0.1 = 10%)
pub const STRONG_IMPACT_THRESHOLD: f64 = 0.1;

/// File and directory names
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_FIGURES_DIR: &str = "figures";
pub const DEFAULT_FIGURE_NAME: &str = "figure1_composite.png";
pub const DEFAULT_CONFIG_FILE: &str = "sunset-precip.toml";
pub const CURVE_FILE_EXTENSION: &str = "npy";
pub const SPATIAL_FILE_PREFIX: &str = "spa_";

/// Export file names
pub const DI_CURVES_FILE: &str = "difference_index_curves.parquet";
pub const CITY_RECORDS_FILE: &str = "city_difference_index.parquet";
pub const STABILITY_FILE: &str = "temporal_stability.csv";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Figure size: 18 cm x 7 cm at 300 dpi
pub const DEFAULT_FIGURE_WIDTH: u32 = 2126;
pub const DEFAULT_FIGURE_HEIGHT: u32 = 827;

/// Parquet defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
