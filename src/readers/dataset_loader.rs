use crate::error::{ProcessingError, Result};
use crate::models::{
    CurveBand, CurveKey, IntensityBucket, Region, SpatialRecord, Statistic, TemporalCurve,
};
use crate::readers::{NpyReader, SpatialReader};
use crate::utils::constants::{FIRST_YEAR, LAST_YEAR};
use crate::utils::filename::{curve_file_name, year_file_name};
use crate::utils::progress::ProgressReporter;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// All curve bands loaded for the requested intensity buckets
#[derive(Debug, Clone, Default)]
pub struct TemporalDataset {
    bands: BTreeMap<(IntensityBucket, Region), CurveBand>,
}

impl TemporalDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, intensity: IntensityBucket, region: Region, band: CurveBand) {
        self.bands.insert((intensity, region), band);
    }

    pub fn band(&self, intensity: IntensityBucket, region: Region) -> Result<&CurveBand> {
        self.bands.get(&(intensity, region)).ok_or_else(|| {
            ProcessingError::MissingData(format!(
                "no {} curves loaded for intensity {}",
                region, intensity
            ))
        })
    }

    pub fn intensities(&self) -> Vec<IntensityBucket> {
        let mut buckets: Vec<IntensityBucket> = self.bands.keys().map(|(i, _)| *i).collect();
        buckets.dedup();
        buckets
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

/// City records per year, in year order
#[derive(Debug, Clone, Default)]
pub struct SpatialDataset {
    pub years: BTreeMap<u16, Vec<SpatialRecord>>,
    pub skipped_years: Vec<u16>,
}

impl SpatialDataset {
    pub fn get(&self, year: u16) -> Option<&[SpatialRecord]> {
        self.years.get(&year).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Curve(CurveKey),
    Year(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputStatus {
    Ok { rows: usize },
    Missing,
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct InventoryEntry {
    pub path: PathBuf,
    pub kind: InputKind,
    pub status: InputStatus,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryReport {
    pub entries: Vec<InventoryEntry>,
}

impl InventoryReport {
    pub fn ok_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, InputStatus::Ok { .. }))
            .count()
    }

    pub fn missing(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == InputStatus::Missing)
    }

    pub fn invalid(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, InputStatus::Invalid(_)))
    }

    pub fn is_complete(&self) -> bool {
        self.ok_count() == self.entries.len()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Input Inventory ===\n");
        summary.push_str(&format!("Expected files: {}\n", self.entries.len()));
        summary.push_str(&format!("Readable: {}\n", self.ok_count()));
        summary.push_str(&format!("Missing: {}\n", self.missing().count()));
        summary.push_str(&format!("Invalid: {}\n", self.invalid().count()));

        for entry in self.missing() {
            summary.push_str(&format!("  missing  {}\n", entry.path.display()));
        }
        for entry in self.invalid() {
            if let InputStatus::Invalid(reason) = &entry.status {
                summary.push_str(&format!("  invalid  {}: {}\n", entry.path.display(), reason));
            }
        }

        summary
    }
}

/// Resolves input file names under a data directory and loads them
pub struct DataLoader {
    data_dir: PathBuf,
    npy_reader: NpyReader,
    spatial_reader: SpatialReader,
}

impl DataLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            npy_reader: NpyReader::new(),
            spatial_reader: SpatialReader::new(),
        }
    }

    pub fn with_spatial_reader(mut self, spatial_reader: SpatialReader) -> Self {
        self.spatial_reader = spatial_reader;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn curve_path(&self, key: &CurveKey) -> PathBuf {
        self.data_dir.join(curve_file_name(key))
    }

    pub fn year_path(&self, year: u16) -> PathBuf {
        self.data_dir.join(year_file_name(year))
    }

    pub fn load_curve(
        &self,
        region: Region,
        intensity: IntensityBucket,
        statistic: Statistic,
    ) -> Result<TemporalCurve> {
        let key = CurveKey::new(region, intensity, statistic);
        let path = self.curve_path(&key);
        debug!("Loading curve {} from {}", key, path.display());
        self.npy_reader.read_curve(&path)
    }

    pub fn load_band(&self, region: Region, intensity: IntensityBucket) -> Result<CurveBand> {
        Ok(CurveBand::new(
            self.load_curve(region, intensity, Statistic::Mean)?,
            self.load_curve(region, intensity, Statistic::Low)?,
            self.load_curve(region, intensity, Statistic::High)?,
        ))
    }

    /// Load urban, rural and urban-only bands for each requested bucket
    pub fn load_temporal(
        &self,
        intensities: &[IntensityBucket],
        progress: Option<&ProgressReporter>,
    ) -> Result<TemporalDataset> {
        let mut dataset = TemporalDataset::new();

        for &intensity in intensities {
            for region in Region::ALL {
                if let Some(p) = progress {
                    p.set_message(&format!("Loading {} {} curves", region, intensity));
                }
                dataset.insert(intensity, region, self.load_band(region, intensity)?);
                if let Some(p) = progress {
                    p.increment(Statistic::ALL.len() as u64);
                }
            }
        }

        info!(
            "Loaded {} curve bands from {}",
            dataset.len(),
            self.data_dir.display()
        );
        Ok(dataset)
    }

    pub fn load_year(&self, year: u16) -> Result<Vec<SpatialRecord>> {
        let path = self.year_path(year);
        debug!("Loading spatial records for {} from {}", year, path.display());
        self.spatial_reader.read_records(&path)
    }

    /// Load every year from 2001 to 2020. Missing and empty years are skipped with
    /// a warning; any other failure stops the run.
    pub fn load_all_years(&self, progress: Option<&ProgressReporter>) -> Result<SpatialDataset> {
        let mut dataset = SpatialDataset::default();

        for year in FIRST_YEAR..=LAST_YEAR {
            match self.load_year(year) {
                Ok(records) if records.is_empty() => {
                    warn!(
                        "{} holds no city records, skipping year {}",
                        year_file_name(year),
                        year
                    );
                    dataset.skipped_years.push(year);
                }
                Ok(records) => {
                    dataset.years.insert(year, records);
                }
                Err(e) if e.is_missing_file() => {
                    warn!("{} not found, skipping year {}", year_file_name(year), year);
                    dataset.skipped_years.push(year);
                }
                Err(e) => return Err(e),
            }
            if let Some(p) = progress {
                p.increment(1);
            }
        }

        if dataset.is_empty() {
            return Err(ProcessingError::MissingFile {
                path: self.year_path(FIRST_YEAR),
            });
        }

        info!(
            "Loaded spatial records for {} years ({} skipped)",
            dataset.len(),
            dataset.skipped_years.len()
        );
        Ok(dataset)
    }

    /// Try every expected input file without stopping at the first failure
    pub fn check_inventory(&self) -> InventoryReport {
        let mut report = InventoryReport::default();

        for key in CurveKey::all() {
            let path = self.curve_path(&key);
            let status = status_of(self.npy_reader.read_curve(&path).map(|c| c.len()));
            report.entries.push(InventoryEntry {
                path,
                kind: InputKind::Curve(key),
                status,
            });
        }

        for year in FIRST_YEAR..=LAST_YEAR {
            let path = self.year_path(year);
            let status = status_of(self.spatial_reader.read_records(&path).map(|r| r.len()));
            report.entries.push(InventoryEntry {
                path,
                kind: InputKind::Year(year),
                status,
            });
        }

        report
    }
}

fn status_of(result: Result<usize>) -> InputStatus {
    match result {
        Ok(rows) => InputStatus::Ok { rows },
        Err(e) if e.is_missing_file() => InputStatus::Missing,
        Err(e) => InputStatus::Invalid(e.to_string()),
    }
}
