use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{IntensityBucket, Region, Statistic, TemporalCurve};
use crate::readers::TemporalDataset;

/// Difference index in percent: (urban - rural) / rural * 100.
///
/// A zero rural value gives NaN, never infinity and never an error.
pub fn difference_index(urban: f64, rural: f64) -> f64 {
    if rural == 0.0 {
        f64::NAN
    } else {
        (urban - rural) / rural * 100.0
    }
}

/// Points where the difference index is undefined. Non-fatal; NaN stays in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputationWarning {
    pub undefined_indices: Vec<usize>,
}

impl fmt::Display for ComputationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "difference index undefined at {} point(s) (rural value is zero)",
            self.undefined_indices.len()
        )?;
        if let Some(first) = self.undefined_indices.first() {
            write!(f, ", first at index {}", first)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceCurve {
    pub curve: TemporalCurve,
    pub warning: Option<ComputationWarning>,
}

impl DifferenceCurve {
    pub fn values(&self) -> &[f64] {
        self.curve.values()
    }
}

/// Point-wise difference index of two matching curves
pub fn difference_curve(urban: &TemporalCurve, rural: &TemporalCurve) -> DifferenceCurve {
    let curve = urban.zip_map(rural, difference_index);

    let undefined_indices: Vec<usize> = rural
        .iter()
        .enumerate()
        .filter(|(_, r)| *r == 0.0)
        .map(|(i, _)| i)
        .collect();

    let warning = if undefined_indices.is_empty() {
        None
    } else {
        Some(ComputationWarning { undefined_indices })
    };

    DifferenceCurve { curve, warning }
}

/// Urban versus rural comparison for one intensity bucket
#[derive(Debug, Clone)]
pub struct BucketComparison {
    pub intensity: IntensityBucket,
    pub mean: DifferenceCurve,
    pub low: DifferenceCurve,
    pub high: DifferenceCurve,
    pub urban_at_sunset: f64,
    pub rural_at_sunset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub intensity: IntensityBucket,
    pub label: &'static str,
    pub urban_at_sunset: f64,
    pub rural_at_sunset: f64,
    pub sunset_difference_index: f64,
    pub mean_difference_index: Option<f64>,
    pub undefined_points: usize,
}

impl BucketComparison {
    pub fn get(&self, statistic: Statistic) -> &DifferenceCurve {
        match statistic {
            Statistic::Mean => &self.mean,
            Statistic::Low => &self.low,
            Statistic::High => &self.high,
        }
    }

    pub fn sunset_difference_index(&self) -> f64 {
        difference_index(self.urban_at_sunset, self.rural_at_sunset)
    }

    pub fn warnings(&self) -> impl Iterator<Item = (Statistic, &ComputationWarning)> {
        Statistic::ALL
            .into_iter()
            .filter_map(move |s| self.get(s).warning.as_ref().map(|w| (s, w)))
    }

    pub fn summary(&self) -> BucketSummary {
        BucketSummary {
            intensity: self.intensity,
            label: self.intensity.label(),
            urban_at_sunset: self.urban_at_sunset,
            rural_at_sunset: self.rural_at_sunset,
            sunset_difference_index: self.sunset_difference_index(),
            mean_difference_index: self.mean.curve.finite_mean(),
            undefined_points: self.warnings().map(|(_, w)| w.undefined_indices.len()).sum(),
        }
    }
}

pub struct Comparator;

impl Comparator {
    pub fn new() -> Self {
        Self
    }

    pub fn compare(
        &self,
        dataset: &TemporalDataset,
        intensity: IntensityBucket,
    ) -> Result<BucketComparison> {
        let urban = dataset.band(intensity, Region::Urban)?;
        let rural = dataset.band(intensity, Region::Rural)?;

        let comparison = BucketComparison {
            intensity,
            mean: difference_curve(&urban.mean, &rural.mean),
            low: difference_curve(&urban.low, &rural.low),
            high: difference_curve(&urban.high, &rural.high),
            urban_at_sunset: urban.mean.at_sunset(),
            rural_at_sunset: rural.mean.at_sunset(),
        };

        for (statistic, warning) in comparison.warnings() {
            warn!("{} {}: {}", intensity, statistic, warning);
        }
        debug!(
            "{}: sunset difference index {:.2}%",
            intensity,
            comparison.sunset_difference_index()
        );

        Ok(comparison)
    }

    pub fn compare_all(&self, dataset: &TemporalDataset) -> Result<Vec<BucketComparison>> {
        dataset
            .intensities()
            .into_iter()
            .map(|intensity| self.compare(dataset, intensity))
            .collect()
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new()
    }
}
