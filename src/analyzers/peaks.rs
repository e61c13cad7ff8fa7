use serde::Serialize;

use crate::models::TemporalCurve;
use crate::utils::constants::{MIDDAY_PEAK_WINDOW, SUNSET_INDEX};

/// Afternoon and sunset maxima of the urban-only curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DoublePeak {
    pub midday_index: usize,
    pub midday_value: f64,
    pub sunset_index: usize,
    pub sunset_value: f64,
}

impl DoublePeak {
    /// Sunset value relative to the midday peak
    pub fn sunset_ratio(&self) -> f64 {
        if self.midday_value == 0.0 {
            f64::NAN
        } else {
            self.sunset_value / self.midday_value
        }
    }
}

/// Largest finite value inside the midday window, paired with the sunset value.
/// `None` when the window holds no finite value.
pub fn find_double_peak(curve: &TemporalCurve) -> Option<DoublePeak> {
    let window = &curve.values()[MIDDAY_PEAK_WINDOW];

    let (offset, midday_value) = window
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        // First maximum wins on ties
        .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })?;

    Some(DoublePeak {
        midday_index: MIDDAY_PEAK_WINDOW.start + offset,
        midday_value,
        sunset_index: SUNSET_INDEX,
        sunset_value: curve.at_sunset(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::CURVE_LENGTH;

    #[test]
    fn test_finds_window_maximum() {
        let mut values = vec![1.0; CURVE_LENGTH];
        values[300] = 9.0; // outside the window
        values[455] = 4.0;
        values[470] = 4.0;
        values[SUNSET_INDEX] = 3.5;
        let curve = TemporalCurve::new(values).unwrap();

        let peak = find_double_peak(&curve).unwrap();
        assert_eq!(peak.midday_index, 455);
        assert_eq!(peak.midday_value, 4.0);
        assert_eq!(peak.sunset_index, SUNSET_INDEX);
        assert_eq!(peak.sunset_value, 3.5);
        assert!((peak.sunset_ratio() - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_nan_window() {
        let mut values = vec![1.0; CURVE_LENGTH];
        for v in &mut values[MIDDAY_PEAK_WINDOW] {
            *v = f64::NAN;
        }
        let curve = TemporalCurve::new(values).unwrap();
        assert!(find_double_peak(&curve).is_none());
    }
}
