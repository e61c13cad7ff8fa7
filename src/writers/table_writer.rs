use crate::analyzers::{BucketSummary, DoublePeak, StabilityReport};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct StabilityRow {
    year: u16,
    n_cities: usize,
    positive_cities: usize,
    percentage_positive: f64,
    strong_negative: usize,
    weak_negative: usize,
    weak_positive: usize,
    strong_positive: usize,
    undefined: usize,
    p5: Option<f64>,
    median: Option<f64>,
    p95: Option<f64>,
}

/// One row per loaded year
pub fn write_stability_csv(report: &StabilityReport, path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;

    for year in &report.years {
        writer.serialize(StabilityRow {
            year: year.year,
            n_cities: year.n_cities,
            positive_cities: year.positive_cities,
            percentage_positive: year.percentage_positive,
            strong_negative: year.categories.strong_negative,
            weak_negative: year.categories.weak_negative,
            weak_positive: year.categories.weak_positive,
            strong_positive: year.categories.strong_positive,
            undefined: year.categories.undefined,
            p5: year.distribution.map(|d| d.p5),
            median: year.distribution.map(|d| d.median),
            p95: year.distribution.map(|d| d.p95),
        })?;
    }

    writer.flush()?;
    Ok(report.years.len())
}

/// Machine-readable record of one run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub data_dir: PathBuf,
    pub buckets: Vec<BucketSummary>,
    pub double_peak: Option<DoublePeak>,
    pub stability: Option<StabilityReport>,
    pub outputs: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            generated_at: Utc::now(),
            data_dir: data_dir.to_path_buf(),
            buckets: Vec::new(),
            double_peak: None,
            stability: None,
            outputs: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
