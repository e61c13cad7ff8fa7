use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProcessingError, Result};
use crate::models::{IntensityBucket, Region, Statistic};
use crate::utils::constants::{CURVE_LENGTH, MIDDAY_INDEX, SUNSET_INDEX};

/// Identifies one precomputed curve file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurveKey {
    pub region: Region,
    pub intensity: IntensityBucket,
    pub statistic: Statistic,
}

impl CurveKey {
    pub fn new(region: Region, intensity: IntensityBucket, statistic: Statistic) -> Self {
        Self {
            region,
            intensity,
            statistic,
        }
    }

    /// Every (region, intensity, statistic) combination, in file order
    pub fn all() -> impl Iterator<Item = CurveKey> {
        IntensityBucket::ALL.into_iter().flat_map(|intensity| {
            Region::ALL.into_iter().flat_map(move |region| {
                Statistic::ALL
                    .into_iter()
                    .map(move |statistic| CurveKey::new(region, intensity, statistic))
            })
        })
    }
}

impl fmt::Display for CurveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.region, self.intensity, self.statistic)
    }
}

/// Interpolated signal from midday to sunset. Always `CURVE_LENGTH` points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalCurve {
    values: Vec<f64>,
}

impl TemporalCurve {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.len() != CURVE_LENGTH {
            return Err(ProcessingError::schema(
                "temporal curve",
                format!("expected {} points, got {}", CURVE_LENGTH, values.len()),
            ));
        }
        Ok(Self { values })
    }

    pub fn constant(value: f64) -> Self {
        Self {
            values: vec![value; CURVE_LENGTH],
        }
    }

    /// Point-wise combination of two curves; both always hold `CURVE_LENGTH` points
    pub fn zip_map(&self, other: &TemporalCurve, f: impl Fn(f64, f64) -> f64) -> TemporalCurve {
        TemporalCurve {
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn at_midday(&self) -> f64 {
        self.values[MIDDAY_INDEX]
    }

    pub fn at_sunset(&self) -> f64 {
        self.values[SUNSET_INDEX]
    }

    /// Mean over finite points; `None` when nothing is finite
    pub fn finite_mean(&self) -> Option<f64> {
        let (sum, count) = self
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0f64, 0usize), |(s, c), v| (s + v, c + 1));

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// Finite (min, max) for axis scaling
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Mean curve with its lower and upper confidence bounds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveBand {
    pub mean: TemporalCurve,
    pub low: TemporalCurve,
    pub high: TemporalCurve,
}

impl CurveBand {
    pub fn new(mean: TemporalCurve, low: TemporalCurve, high: TemporalCurve) -> Self {
        Self { mean, low, high }
    }

    pub fn get(&self, statistic: Statistic) -> &TemporalCurve {
        match statistic {
            Statistic::Mean => &self.mean,
            Statistic::Low => &self.low,
            Statistic::High => &self.high,
        }
    }

    /// Finite range across all three curves
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        [&self.mean, &self.low, &self.high]
            .iter()
            .filter_map(|c| c.finite_range())
            .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)))
    }
}
