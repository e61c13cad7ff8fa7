pub mod difference;
pub mod peaks;
pub mod spatial_summary;

pub use difference::{
    difference_curve, difference_index, BucketComparison, BucketSummary, Comparator,
    ComputationWarning, DifferenceCurve,
};
pub use peaks::{find_double_peak, DoublePeak};
pub use spatial_summary::{
    category_counts, percentage_positive, percentile, CategoryCounts, SpatialAnalyzer,
    StabilityReport, YearSummary,
};
