use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::constants::STRONG_IMPACT_THRESHOLD;

/// One city in one year: location and sunset difference index (fraction)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct SpatialRecord {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub difference_index: f64,
}

impl SpatialRecord {
    pub fn new(latitude: f64, longitude: f64, difference_index: f64) -> Self {
        Self {
            latitude,
            longitude,
            difference_index,
        }
    }

    pub fn category(&self) -> Option<ImpactCategory> {
        ImpactCategory::classify(self.difference_index)
    }

    /// Zero counts as positive, matching the `0% to 10%` map class
    pub fn is_positive(&self) -> bool {
        self.category().is_some_and(|c| c.is_positive())
    }
}

/// Map colour class of a city's difference index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactCategory {
    StrongNegative,
    WeakNegative,
    WeakPositive,
    StrongPositive,
}

impl ImpactCategory {
    pub const ALL: [ImpactCategory; 4] = [
        ImpactCategory::StrongNegative,
        ImpactCategory::WeakNegative,
        ImpactCategory::WeakPositive,
        ImpactCategory::StrongPositive,
    ];

    /// NaN has no category
    pub fn classify(difference_index: f64) -> Option<Self> {
        if difference_index.is_nan() {
            None
        } else if difference_index < -STRONG_IMPACT_THRESHOLD {
            Some(ImpactCategory::StrongNegative)
        } else if difference_index < 0.0 {
            Some(ImpactCategory::WeakNegative)
        } else if difference_index < STRONG_IMPACT_THRESHOLD {
            Some(ImpactCategory::WeakPositive)
        } else {
            Some(ImpactCategory::StrongPositive)
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            ImpactCategory::WeakPositive | ImpactCategory::StrongPositive
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImpactCategory::StrongNegative => "< -10%",
            ImpactCategory::WeakNegative => "-10% to 0%",
            ImpactCategory::WeakPositive => "0% to 10%",
            ImpactCategory::StrongPositive => "> 10%",
        }
    }
}
