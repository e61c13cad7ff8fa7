use crate::analyzers::{
    find_double_peak, BucketComparison, Comparator, SpatialAnalyzer, StabilityReport,
};
use crate::cli::args::{Cli, Commands};
use crate::error::{ProcessingError, Result};
use crate::models::{IntensityBucket, Region, SpatialRecord, Statistic};
use crate::readers::{DataLoader, SpatialDataset, TemporalDataset};
use crate::settings::{Settings, SettingsOverrides};
use crate::utils::constants::{
    CITY_RECORDS_FILE, DI_CURVES_FILE, FIRST_YEAR, LAST_YEAR, RUN_SUMMARY_FILE, STABILITY_FILE,
};
use crate::utils::filename::{default_export_dir, difference_file_name};
use crate::utils::progress::ProgressReporter;
use crate::writers::{
    write_npy, write_stability_csv, FigureInput, FigureRenderer, ParquetWriter, RunSummary,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.config.clone();

    match cli.resolved_command() {
        Commands::Render {
            data_dir,
            figures_dir,
            output,
            year,
            intensity,
        } => {
            let overrides = SettingsOverrides {
                data_dir,
                figures_dir,
                year,
                intensity,
                ..Default::default()
            };
            let settings = Settings::load(config.as_deref(), &overrides)?;
            let output = output.unwrap_or_else(|| settings.figure_path());

            let path = render_figure(&settings, &output, false)?;
            println!("Figure written to {}", path.display());
        }

        Commands::Summary { data_dir, json } => {
            let overrides = SettingsOverrides {
                data_dir,
                ..Default::default()
            };
            let settings = Settings::load(config.as_deref(), &overrides)?;

            let analysis = Analysis::load(&settings, &IntensityBucket::ALL, json)?;
            let summary = analysis.run_summary(&settings);

            if json {
                println!("{}", summary.to_json()?);
            } else {
                println!("{}", analysis.text_summary());
            }
        }

        Commands::Validate { data_dir } => {
            let overrides = SettingsOverrides {
                data_dir,
                ..Default::default()
            };
            let settings = Settings::load(config.as_deref(), &overrides)?;

            println!("Validating inputs in {}", settings.data_dir.display());
            let progress = ProgressReporter::new_spinner("Checking input files...", false);
            let report = DataLoader::new(&settings.data_dir).check_inventory();
            progress.finish_with_message("Inventory complete");

            println!("\n{}", report.summary());

            if report.is_complete() {
                println!("✅ All {} input files are readable", report.entries.len());
            } else {
                let failed = report.entries.len() - report.ok_count();
                println!("⚠️  {} input files missing or invalid", failed);
                return Err(ProcessingError::MissingData(format!(
                    "{} of {} input files missing or invalid",
                    failed,
                    report.entries.len()
                )));
            }
        }

        Commands::Export {
            data_dir,
            figures_dir,
            output_dir,
            compression,
        } => {
            let overrides = SettingsOverrides {
                data_dir,
                figures_dir,
                compression,
                ..Default::default()
            };
            let settings = Settings::load(config.as_deref(), &overrides)?;
            let output_dir =
                output_dir.unwrap_or_else(|| default_export_dir(&settings.figures_dir));

            let report = export_tables(&settings, &output_dir, false)?;
            println!("\n{}", report.summary());
            println!("Export complete!");
        }
    }

    Ok(())
}

/// Everything loaded and computed for one run
pub struct Analysis {
    pub data_dir: PathBuf,
    pub temporal: TemporalDataset,
    pub comparisons: Vec<BucketComparison>,
    pub spatial: SpatialDataset,
    pub stability: StabilityReport,
}

impl Analysis {
    /// Load the requested buckets and every available year, then compute
    /// difference indices and the stability series
    pub fn load(
        settings: &Settings,
        intensities: &[IntensityBucket],
        silent: bool,
    ) -> Result<Self> {
        let loader = DataLoader::new(&settings.data_dir);

        info!("Loading temporal curves from {}", settings.data_dir.display());
        let curve_count = (intensities.len() * Region::ALL.len() * Statistic::ALL.len()) as u64;
        let progress = ProgressReporter::new(curve_count, "Loading curves", silent);
        let temporal = loader.load_temporal(intensities, Some(&progress))?;
        progress.finish_with_message(&format!("Loaded {} curves", curve_count));

        info!("Loading city tables {}-{}", FIRST_YEAR, LAST_YEAR);
        let years = u64::from(LAST_YEAR - FIRST_YEAR + 1);
        let progress = ProgressReporter::new(years, "Loading city tables", silent);
        let spatial = loader.load_all_years(Some(&progress))?;
        progress.finish_with_message(&format!("Loaded {} years", spatial.len()));

        info!("Computing difference indices");
        let comparisons = Comparator::new().compare_all(&temporal)?;
        let stability = SpatialAnalyzer::new().stability(&spatial)?;

        Ok(Self {
            data_dir: settings.data_dir.clone(),
            temporal,
            comparisons,
            spatial,
            stability,
        })
    }

    pub fn run_summary(&self, settings: &Settings) -> RunSummary {
        let mut summary = RunSummary::new(&self.data_dir);
        summary.buckets = self.comparisons.iter().map(|c| c.summary()).collect();
        summary.double_peak = self
            .temporal
            .band(settings.intensity, Region::Turban)
            .ok()
            .and_then(|band| find_double_peak(&band.mean));
        summary.stability = Some(self.stability.clone());
        summary
    }

    pub fn text_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Sunset Difference Index ===\n");
        for comparison in &self.comparisons {
            let bucket = comparison.summary();
            summary.push_str(&format!(
                "{:<14} urban {:.3}  rural {:.3}  DI {:+.1}%",
                bucket.label,
                bucket.urban_at_sunset,
                bucket.rural_at_sunset,
                bucket.sunset_difference_index
            ));
            if let Some(mean) = bucket.mean_difference_index {
                summary.push_str(&format!("  (daily mean {:+.1}%)", mean));
            }
            if bucket.undefined_points > 0 {
                summary.push_str(&format!("  [{} undefined points]", bucket.undefined_points));
            }
            summary.push('\n');
        }

        for intensity in self.temporal.intensities() {
            if let Some(peak) = self
                .temporal
                .band(intensity, Region::Turban)
                .ok()
                .and_then(|band| find_double_peak(&band.mean))
            {
                summary.push_str(&format!(
                    "{} urban-only peaks: midday {:.3} at {}, sunset {:.3} ({:.0}% of midday)\n",
                    intensity,
                    peak.midday_value,
                    peak.midday_index,
                    peak.sunset_value,
                    peak.sunset_ratio() * 100.0
                ));
            }
        }

        summary.push('\n');
        summary.push_str(&self.stability.summary());
        summary
    }
}

/// Load inputs for the configured bucket and year and render the composite figure
pub fn render_figure(settings: &Settings, output: &Path, silent: bool) -> Result<PathBuf> {
    let analysis = Analysis::load(settings, &[settings.intensity], silent)?;

    // An empty map-year table reaches the renderer, which rejects it
    let year_path = DataLoader::new(&settings.data_dir).year_path(settings.year);
    let records: &[SpatialRecord] = match analysis.spatial.get(settings.year) {
        Some(records) => records,
        None if year_path.exists() => &[],
        None => {
            warn!("No city table loaded for {}", settings.year);
            return Err(ProcessingError::MissingFile { path: year_path });
        }
    };

    let urban = analysis.temporal.band(settings.intensity, Region::Urban)?;
    let rural = analysis.temporal.band(settings.intensity, Region::Rural)?;
    let turban = analysis.temporal.band(settings.intensity, Region::Turban)?;

    let input = FigureInput {
        year: settings.year,
        records,
        stability: &analysis.stability,
        intensity: settings.intensity,
        urban,
        rural,
        turban,
        double_peak: find_double_peak(&turban.mean),
    };

    info!("Rendering {} figure for {}", settings.intensity, settings.year);
    let progress = ProgressReporter::new_spinner("Rendering figure...", silent);
    let path = FigureRenderer::new()
        .with_size(settings.width, settings.height)
        .render(&input, output)?;
    progress.finish_with_message("Figure rendered");

    Ok(path)
}

#[derive(Debug, Default)]
pub struct ExportReport {
    pub files: Vec<PathBuf>,
    pub curve_rows: usize,
    pub city_rows: usize,
    pub stability_rows: usize,
}

impl ExportReport {
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Export Summary ===\n");
        summary.push_str(&format!("Difference index rows: {}\n", self.curve_rows));
        summary.push_str(&format!("City rows: {}\n", self.city_rows));
        summary.push_str(&format!("Stability rows: {}\n", self.stability_rows));
        summary.push_str(&format!("Files written: {}\n", self.files.len()));
        for file in &self.files {
            summary.push_str(&format!("  {}\n", file.display()));
        }

        summary
    }
}

/// Write every derived table for all intensity buckets into `output_dir`
pub fn export_tables(
    settings: &Settings,
    output_dir: &Path,
    silent: bool,
) -> Result<ExportReport> {
    let analysis = Analysis::load(settings, &IntensityBucket::ALL, silent)?;
    let writer = ParquetWriter::new().with_compression(&settings.compression)?;
    let mut report = ExportReport::default();

    std::fs::create_dir_all(output_dir)?;
    info!("Exporting derived tables to {}", output_dir.display());

    let curves_path = output_dir.join(DI_CURVES_FILE);
    report.curve_rows = writer.write_difference_curves(&analysis.comparisons, &curves_path)?;
    info!("{}", writer.get_file_info(&curves_path)?.summary());
    report.files.push(curves_path);

    let cities_path = output_dir.join(CITY_RECORDS_FILE);
    report.city_rows = writer.write_spatial_records(&analysis.spatial, &cities_path)?;
    report.files.push(cities_path);

    let stability_path = output_dir.join(STABILITY_FILE);
    report.stability_rows = write_stability_csv(&analysis.stability, &stability_path)?;
    report.files.push(stability_path);

    for comparison in &analysis.comparisons {
        for statistic in Statistic::ALL {
            let path = output_dir.join(difference_file_name(comparison.intensity, statistic));
            write_npy(comparison.get(statistic).values(), &path)?;
            report.files.push(path);
        }
    }

    let summary_path = output_dir.join(RUN_SUMMARY_FILE);
    let mut summary = analysis.run_summary(settings);
    summary.outputs = report.files.clone();
    summary.write_json(&summary_path)?;
    report.files.push(summary_path);

    Ok(report)
}
