use serde::{Deserialize, Serialize};

use super::chart::ChartData;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YRange {
    pub min: f64,
    pub max: f64,
}

/// Min/max of one measure over all buckets, `None` if no bucket holds it.
#[must_use]
pub fn chart_y_range(data: &ChartData, field: &str) -> Option<YRange> {
    data.buckets
        .values()
        .filter_map(|bucket| bucket.value(field))
        .fold(None, |range, value| {
            Some(match range {
                None => YRange {
                    min: value,
                    max: value,
                },
                Some(YRange { min, max }) => YRange {
                    min: min.min(value),
                    max: max.max(value),
                },
            })
        })
}

/// Whether two measure maxima can share one value axis.
///
/// Symmetric: both zero, or same sign with magnitudes within `ratio_limit` of each other.
#[must_use]
pub fn have_similar_range(a: f64, b: f64, ratio_limit: f64) -> bool {
    if a == 0.0 && b == 0.0 {
        return true;
    }
    if a == 0.0 || b == 0.0 || a.is_sign_negative() != b.is_sign_negative() {
        return false;
    }
    let (low, high) = (a.abs().min(b.abs()), a.abs().max(b.abs()));
    high / low <= ratio_limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similar_range_is_symmetric() {
        for (a, b) in [(1.0, 9.0), (100.0, 5.0), (-3.0, 4.0), (0.0, 2.0), (0.0, 0.0)] {
            assert_eq!(have_similar_range(a, b, 10.0), have_similar_range(b, a, 10.0));
        }
        assert!(have_similar_range(10.0, 100.0, 10.0));
        assert!(!have_similar_range(10.0, 101.0, 10.0));
        assert!(!have_similar_range(-1.0, 1.0, 10.0));
    }
}
