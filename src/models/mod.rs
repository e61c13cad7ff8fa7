pub mod curve;
pub mod dimension;
pub mod spatial;

pub use curve::{CurveBand, CurveKey, TemporalCurve};
pub use dimension::{AxisLimits, IntensityBucket, PanelKind, Region, Statistic};
pub use spatial::{ImpactCategory, SpatialRecord};
