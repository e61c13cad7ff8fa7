use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// Hourly precipitation intensity range a curve was aggregated over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityBucket {
    /// 0.2-0.5 mm/hr
    #[serde(alias = "low")]
    Light,
    /// 0.5-1 mm/hr
    Moderate,
    /// >1 mm/hr
    #[serde(alias = "other")]
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Urban,
    Rural,
    /// Precipitation seen at the urban site with no rural counterpart
    Turban,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Low,
    High,
}

/// Which temporal panel an axis range belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    UrbanRural,
    UrbanOnly,
}

/// Fixed y-axis range and tick positions for a temporal panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimits {
    pub min: f64,
    pub max: f64,
    pub ticks: &'static [f64],
}

impl AxisLimits {
    const fn new(min: f64, max: f64, ticks: &'static [f64]) -> Self {
        Self { min, max, ticks }
    }
}

impl IntensityBucket {
    pub const ALL: [IntensityBucket; 3] = [
        IntensityBucket::Light,
        IntensityBucket::Moderate,
        IntensityBucket::Heavy,
    ];

    pub fn file_token(&self) -> &'static str {
        match self {
            IntensityBucket::Light => "02_05",
            IntensityBucket::Moderate => "05_1",
            IntensityBucket::Heavy => "1",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntensityBucket::Light => "light",
            IntensityBucket::Moderate => "moderate",
            IntensityBucket::Heavy => "heavy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntensityBucket::Light => "0.2-0.5 mm/hr",
            IntensityBucket::Moderate => "0.5-1 mm/hr",
            IntensityBucket::Heavy => ">1 mm/hr",
        }
    }

    pub fn title(&self) -> String {
        let kind = match self {
            IntensityBucket::Light => "Light",
            IntensityBucket::Moderate => "Moderate",
            IntensityBucket::Heavy => "Heavy",
        };
        format!("{} Precipitation ({})", kind, self.label())
    }

    pub fn axis_limits(&self, panel: PanelKind) -> AxisLimits {
        match (panel, self) {
            (PanelKind::UrbanRural, IntensityBucket::Light) => {
                AxisLimits::new(6.8, 9.8, &[7.0, 8.0, 9.0])
            }
            (PanelKind::UrbanRural, IntensityBucket::Moderate) => {
                AxisLimits::new(5.0, 8.0, &[5.0, 6.0, 7.0, 8.0])
            }
            (PanelKind::UrbanRural, IntensityBucket::Heavy) => {
                AxisLimits::new(8.0, 16.0, &[8.0, 10.0, 12.0, 14.0, 16.0])
            }
            (PanelKind::UrbanOnly, IntensityBucket::Light) => {
                AxisLimits::new(2.8, 4.2, &[3.0, 3.5, 4.0])
            }
            (PanelKind::UrbanOnly, IntensityBucket::Moderate) => {
                AxisLimits::new(0.9, 1.3, &[0.9, 1.0, 1.1, 1.2, 1.3])
            }
            (PanelKind::UrbanOnly, IntensityBucket::Heavy) => {
                AxisLimits::new(0.3, 0.7, &[0.3, 0.4, 0.5, 0.6, 0.7])
            }
        }
    }
}

impl FromStr for IntensityBucket {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" | "low" | "02_05" => Ok(IntensityBucket::Light),
            "moderate" | "05_1" => Ok(IntensityBucket::Moderate),
            "heavy" | "other" | "1" => Ok(IntensityBucket::Heavy),
            other => Err(ProcessingError::Config(format!(
                "Unknown intensity bucket '{}'. Expected one of: light, moderate, heavy",
                other
            ))),
        }
    }
}

impl fmt::Display for IntensityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Urban, Region::Rural, Region::Turban];

    pub fn file_token(&self) -> &'static str {
        match self {
            Region::Urban => "urban",
            Region::Rural => "rural",
            Region::Turban => "turban",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Urban => "Urban",
            Region::Rural => "Rural",
            Region::Turban => "Urban Only",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_token())
    }
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::Mean, Statistic::Low, Statistic::High];

    pub fn file_token(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Low => "low",
            Statistic::High => "high",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_token())
    }
}
