use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{ImpactCategory, SpatialRecord};
use crate::readers::SpatialDataset;

/// Percentage of records with a non-negative difference index: 100 * P / N.
///
/// Records with a NaN index count towards N but never towards P.
pub fn percentage_positive(records: &[SpatialRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let positive = records.iter().filter(|r| r.is_positive()).count();
    Some(100.0 * positive as f64 / records.len() as f64)
}

/// Linear-interpolated percentile (`q` in 0..=100), NaNs ignored
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=100.0).contains(&q) {
        return None;
    }

    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub strong_negative: usize,
    pub weak_negative: usize,
    pub weak_positive: usize,
    pub strong_positive: usize,
    pub undefined: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: ImpactCategory) -> usize {
        match category {
            ImpactCategory::StrongNegative => self.strong_negative,
            ImpactCategory::WeakNegative => self.weak_negative,
            ImpactCategory::WeakPositive => self.weak_positive,
            ImpactCategory::StrongPositive => self.strong_positive,
        }
    }

    pub fn positive(&self) -> usize {
        self.weak_positive + self.strong_positive
    }

    pub fn total(&self) -> usize {
        self.strong_negative
            + self.weak_negative
            + self.weak_positive
            + self.strong_positive
            + self.undefined
    }
}

pub fn category_counts(records: &[SpatialRecord]) -> CategoryCounts {
    let mut counts = CategoryCounts::default();

    for record in records {
        match record.category() {
            Some(ImpactCategory::StrongNegative) => counts.strong_negative += 1,
            Some(ImpactCategory::WeakNegative) => counts.weak_negative += 1,
            Some(ImpactCategory::WeakPositive) => counts.weak_positive += 1,
            Some(ImpactCategory::StrongPositive) => counts.strong_positive += 1,
            None => counts.undefined += 1,
        }
    }

    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub p5: f64,
    pub median: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: u16,
    pub n_cities: usize,
    pub positive_cities: usize,
    pub percentage_positive: f64,
    pub categories: CategoryCounts,
    pub distribution: Option<DistributionSummary>,
}

/// Year-to-year behaviour of the positive-DI percentage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilityReport {
    pub years: Vec<YearSummary>,
    pub skipped_years: Vec<u16>,
    pub global_percentage_positive: f64,
    pub mean_percentage: f64,
    pub std_percentage: Option<f64>,
    pub min_percentage: f64,
    pub max_percentage: f64,
    pub mean_cities: f64,
}

impl StabilityReport {
    /// Temporal stability: max minus min yearly percentage
    pub fn range(&self) -> f64 {
        self.max_percentage - self.min_percentage
    }

    pub fn year(&self, year: u16) -> Option<&YearSummary> {
        self.years.iter().find(|y| y.year == year)
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Temporal Stability ===\n");
        summary.push_str(&format!(
            "Years: {} loaded, {} skipped\n",
            self.years.len(),
            self.skipped_years.len()
        ));
        summary.push_str(&format!(
            "Cities with positive DI (all years pooled): {:.1}%\n",
            self.global_percentage_positive
        ));
        summary.push_str(&format!("Mean yearly percentage: {:.1}%\n", self.mean_percentage));
        if let Some(std) = self.std_percentage {
            summary.push_str(&format!("Std: {:.1}%\n", std));
        }
        summary.push_str(&format!(
            "Range: {:.1}-{:.1}% (spread {:.1} points)\n",
            self.min_percentage,
            self.max_percentage,
            self.range()
        ));
        summary.push_str(&format!("Mean cities per year: {:.0}\n", self.mean_cities));

        for year in &self.years {
            summary.push_str(&format!(
                "  {}: {:>4} cities, {:.1}% positive\n",
                year.year, year.n_cities, year.percentage_positive
            ));
        }

        summary
    }
}

pub struct SpatialAnalyzer;

impl SpatialAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize_year(&self, year: u16, records: &[SpatialRecord]) -> Result<YearSummary> {
        let percentage = percentage_positive(records).ok_or_else(|| {
            ProcessingError::MissingData(format!("no city records for {}", year))
        })?;
        let categories = category_counts(records);

        let values: Vec<f64> = records.iter().map(|r| r.difference_index).collect();
        let distribution = match (
            percentile(&values, 5.0),
            percentile(&values, 50.0),
            percentile(&values, 95.0),
        ) {
            (Some(p5), Some(median), Some(p95)) => Some(DistributionSummary { p5, median, p95 }),
            _ => None,
        };

        debug!("{}: {} cities, {:.1}% positive", year, records.len(), percentage);

        Ok(YearSummary {
            year,
            n_cities: records.len(),
            positive_cities: categories.positive(),
            percentage_positive: percentage,
            categories,
            distribution,
        })
    }

    pub fn stability(&self, dataset: &SpatialDataset) -> Result<StabilityReport> {
        let mut skipped_years = dataset.skipped_years.clone();
        for (year, records) in &dataset.years {
            if records.is_empty() {
                warn!("No city records for {}, left out of the stability series", year);
                skipped_years.push(*year);
            }
        }
        skipped_years.sort_unstable();

        let years = dataset
            .years
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(year, records)| self.summarize_year(*year, records))
            .collect::<Result<Vec<_>>>()?;

        if years.is_empty() {
            return Err(ProcessingError::MissingData(
                "no years available for stability analysis".to_string(),
            ));
        }

        let percentages: Vec<f64> = years.iter().map(|y| y.percentage_positive).collect();
        let n = percentages.len() as f64;
        let mean = percentages.iter().sum::<f64>() / n;
        let std = if percentages.len() > 1 {
            let variance =
                percentages.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(variance.sqrt())
        } else {
            None
        };

        let min = percentages.iter().copied().fold(f64::INFINITY, f64::min);
        let max = percentages.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let total_cities: usize = years.iter().map(|y| y.n_cities).sum();
        let total_positive: usize = years.iter().map(|y| y.positive_cities).sum();

        Ok(StabilityReport {
            global_percentage_positive: 100.0 * total_positive as f64 / total_cities as f64,
            mean_percentage: mean,
            std_percentage: std,
            min_percentage: min,
            max_percentage: max,
            mean_cities: total_cities as f64 / n,
            skipped_years,
            years,
        })
    }
}

impl Default for SpatialAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
