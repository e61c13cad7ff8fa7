use crate::error::{ProcessingError, Result};
use crate::models::IntensityBucket;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_CONFIG_FILE, DEFAULT_DATA_DIR, DEFAULT_FIGURES_DIR, DEFAULT_FIGURE_HEIGHT,
    DEFAULT_FIGURE_NAME, DEFAULT_FIGURE_WIDTH, DEFAULT_YEAR,
};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

const COMPRESSIONS: [&str; 5] = [
    COMPRESSION_SNAPPY,
    COMPRESSION_GZIP,
    COMPRESSION_LZ4,
    COMPRESSION_ZSTD,
    COMPRESSION_NONE,
];

/// Resolved run settings: built-in defaults, then the TOML file, then CLI flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub figures_dir: PathBuf,

    #[validate(range(min = 2001, max = 2020))]
    pub year: u16,

    pub intensity: IntensityBucket,

    #[validate(range(min = 300, max = 20000))]
    pub width: u32,

    #[validate(range(min = 150, max = 20000))]
    pub height: u32,

    pub compression: String,
}

/// Values given on the command line; `None` leaves the lower layers in place
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub data_dir: Option<PathBuf>,
    pub figures_dir: Option<PathBuf>,
    pub year: Option<u16>,
    pub intensity: Option<IntensityBucket>,
    pub compression: Option<String>,
}

impl Settings {
    /// Load settings. An explicit `config_file` must exist; the default
    /// `sunset-precip.toml` in the working directory is optional.
    pub fn load(config_file: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if required && !path.exists() {
            return Err(ProcessingError::MissingFile { path });
        }

        let builder = Config::builder()
            .set_default("data_dir", DEFAULT_DATA_DIR)?
            .set_default("figures_dir", DEFAULT_FIGURES_DIR)?
            .set_default("year", i64::from(DEFAULT_YEAR))?
            .set_default("intensity", IntensityBucket::Light.name())?
            .set_default("width", i64::from(DEFAULT_FIGURE_WIDTH))?
            .set_default("height", i64::from(DEFAULT_FIGURE_HEIGHT))?
            .set_default("compression", COMPRESSION_SNAPPY)?
            .add_source(File::from(path.as_path()).required(required))
            .set_override_option(
                "data_dir",
                overrides.data_dir.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option(
                "figures_dir",
                overrides
                    .figures_dir
                    .as_ref()
                    .map(|p| p.display().to_string()),
            )?
            .set_override_option("year", overrides.year.map(i64::from))?
            .set_override_option("intensity", overrides.intensity.map(|i| i.name()))?
            .set_override_option("compression", overrides.compression.clone())?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.check()?;

        debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }

    /// Field validation plus the checks validator attributes cannot express
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        let compression = self.compression.to_lowercase();
        if !COMPRESSIONS.contains(&compression.as_str()) {
            return Err(ProcessingError::Config(format!(
                "Unsupported compression: {}. Use snappy, gzip, lz4, zstd, or none",
                self.compression
            )));
        }

        Ok(())
    }

    pub fn figure_path(&self) -> PathBuf {
        self.figures_dir.join(DEFAULT_FIGURE_NAME)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            figures_dir: PathBuf::from(DEFAULT_FIGURES_DIR),
            year: DEFAULT_YEAR,
            intensity: IntensityBucket::Light,
            width: DEFAULT_FIGURE_WIDTH,
            height: DEFAULT_FIGURE_HEIGHT,
            compression: COMPRESSION_SNAPPY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.check().is_ok());
        assert_eq!(
            settings.figure_path(),
            PathBuf::from("figures/figure1_composite.png")
        );
    }

    #[test]
    fn test_file_values_override_defaults() -> Result<()> {
        let file = toml_file("data_dir = \"/srv/precip\"\nyear = 2015\nintensity = \"heavy\"\n");

        let settings = Settings::load(Some(file.path()), &SettingsOverrides::default())?;

        assert_eq!(settings.data_dir, PathBuf::from("/srv/precip"));
        assert_eq!(settings.year, 2015);
        assert_eq!(settings.intensity, IntensityBucket::Heavy);
        assert_eq!(settings.figures_dir, PathBuf::from(DEFAULT_FIGURES_DIR));
        assert_eq!(settings.width, DEFAULT_FIGURE_WIDTH);
        Ok(())
    }

    #[test]
    fn test_cli_overrides_file() -> Result<()> {
        let file = toml_file("year = 2015\ncompression = \"gzip\"\nfigures_dir = \"plots\"\n");
        let overrides = SettingsOverrides {
            year: Some(2003),
            intensity: Some(IntensityBucket::Moderate),
            figures_dir: Some(PathBuf::from("/tmp/paper")),
            ..Default::default()
        };

        let settings = Settings::load(Some(file.path()), &overrides)?;

        assert_eq!(settings.year, 2003);
        assert_eq!(settings.intensity, IntensityBucket::Moderate);
        assert_eq!(settings.compression, "gzip");
        assert_eq!(
            settings.figure_path(),
            PathBuf::from("/tmp/paper/figure1_composite.png")
        );
        Ok(())
    }

    #[test]
    fn test_out_of_range_year_rejected() {
        let file = toml_file("year = 1999\n");
        let result = Settings::load(Some(file.path()), &SettingsOverrides::default());
        assert!(matches!(result, Err(ProcessingError::Validation(_))));
    }

    #[test]
    fn test_unknown_compression_rejected() {
        let settings = Settings {
            compression: "brotli".to_string(),
            ..Settings::default()
        };
        assert!(matches!(settings.check(), Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_config() {
        let result = Settings::load(
            Some(Path::new("/nonexistent/sunset-precip.toml")),
            &SettingsOverrides::default(),
        );
        assert!(matches!(result, Err(ProcessingError::MissingFile { .. })));
    }
}
