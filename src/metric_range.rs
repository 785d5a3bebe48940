use parking_lot::Mutex;
use serde::Serialize;

/// Observed `[min, max]` of the metric values, used for display scaling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MetricRange {
    #[default]
    Uninitialized,
    Observed { min: f64, max: f64 },
}
impl MetricRange {
    /// Range over every numeric value of a response matrix; nulls and NaN are skipped.
    pub fn from_matrix(matrix: &[Vec<Option<f64>>]) -> Self {
        let mut range = MetricRange::Uninitialized;
        for v in matrix.iter().flatten().flatten().copied() {
            if v.is_nan() {
                continue;
            }
            range = match range {
                MetricRange::Uninitialized => MetricRange::Observed { min: v, max: v },
                MetricRange::Observed { min, max } => MetricRange::Observed {
                    min: min.min(v),
                    max: max.max(v),
                },
            };
        }
        range
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        matches!(self, MetricRange::Observed { .. })
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            MetricRange::Uninitialized => None,
            MetricRange::Observed { min, max } => Some((*min, *max)),
        }
    }
}

/// Session-owned metric range. The first observed response sets it, later
/// responses leave it alone until `reset`.
#[derive(Debug, Default)]
pub struct MetricRangeCell(Mutex<MetricRange>);
impl MetricRangeCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> MetricRange {
        *self.0.lock()
    }

    /// Returns true when this call initialized the range.
    pub fn observe_first(&self, matrix: &[Vec<Option<f64>>]) -> bool {
        let mut range = self.0.lock();
        if range.is_initialized() {
            return false;
        }
        let observed = MetricRange::from_matrix(matrix);
        if !observed.is_initialized() {
            return false;
        }
        *range = observed;
        true
    }

    pub fn reset(&self) {
        *self.0.lock() = MetricRange::Uninitialized;
    }
}
