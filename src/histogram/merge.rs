use crate::{column::ColumnId, errors::PipelineError};

use super::{HistogramEntry, HistogramState};

/// Write `values[j]` into `entries[j]` through `apply`. Purely positional:
/// nothing is reordered and no bucket is re-derived.
#[inline]
pub fn merge_positional<T>(
    entries: &mut [HistogramEntry],
    values: &[T],
    apply: impl Fn(&mut HistogramEntry, &T),
) {
    for (entry, value) in entries.iter_mut().zip(values) {
        apply(entry, value);
    }
}

/// Check the whole response against the current state before anything is written,
/// so a bad response never leaves a half-merged histogram behind.
fn check_aligned<T>(
    state: &HistogramState,
    columns: &[ColumnId],
    matrix: &[Vec<T>],
) -> Result<(), PipelineError> {
    if columns.len() != matrix.len() {
        let column = columns
            .get(matrix.len())
            .or(columns.last())
            .cloned()
            .unwrap_or_default();
        return Err(PipelineError::misaligned(&column, columns.len(), matrix.len()));
    }
    for (column, values) in columns.iter().zip(matrix) {
        let expected = state.get(column).map(|e| e.len()).unwrap_or(0);
        if expected != values.len() {
            return Err(PipelineError::misaligned(column, expected, values.len()));
        }
    }
    Ok(())
}

fn merge_matrix<T>(
    state: &mut HistogramState,
    columns: &[ColumnId],
    matrix: &[Vec<T>],
    apply: impl Fn(&mut HistogramEntry, &T),
) -> Result<(), PipelineError> {
    check_aligned(state, columns, matrix)?;
    for (column, values) in columns.iter().zip(matrix) {
        if let Some(entries) = state.get_mut(column) {
            merge_positional(entries, values, &apply);
        }
    }
    Ok(())
}

/// `filtered_count` is always taken from the response; `count` only when the
/// request carried no filter.
pub fn merge_counts(
    state: &mut HistogramState,
    columns: &[ColumnId],
    matrix: &[Vec<u64>],
    unfiltered: bool,
) -> Result<(), PipelineError> {
    merge_matrix(state, columns, matrix, |entry, value| {
        if unfiltered {
            entry.count = Some(*value);
        }
        entry.filtered_count = Some(*value);
    })
}

/// Missing or non-numeric metric values are shown as 0.
pub fn merge_metrics(
    state: &mut HistogramState,
    columns: &[ColumnId],
    matrix: &[Vec<Option<f64>>],
) -> Result<(), PipelineError> {
    merge_matrix(state, columns, matrix, |entry, value| {
        entry.metric = Some(metric_or_zero(*value));
    })
}

#[inline]
pub fn metric_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::HistogramEntry;

    fn state(columns: &[(&str, usize)]) -> (HistogramState, Vec<ColumnId>) {
        let mut state = HistogramState::default();
        let mut ids = Vec::new();
        for (id, n) in columns {
            state.insert(
                id.to_string(),
                (0..*n).map(|i| HistogramEntry::new(i as f64)).collect(),
            );
            ids.push(id.to_string());
        }
        (state, ids)
    }

    #[test]
    fn test_merge_counts_unfiltered() {
        let (mut state, ids) = state(&[("A", 2), ("B", 3)]);
        merge_counts(&mut state, &ids, &[vec![10, 5], vec![1, 2, 3]], true).unwrap();
        let a: Vec<_> = state["A"].iter().map(|e| (e.count, e.filtered_count)).collect();
        assert_eq!(a, vec![(Some(10), Some(10)), (Some(5), Some(5))]);
        let b: Vec<_> = state["B"].iter().map(|e| e.count.unwrap()).collect();
        assert_eq!(b, vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_counts_filtered_keeps_count() {
        let (mut state, ids) = state(&[("A", 2)]);
        merge_counts(&mut state, &ids, &[vec![10, 5]], true).unwrap();
        merge_counts(&mut state, &ids, &[vec![3, 0]], false).unwrap();
        let a: Vec<_> = state["A"].iter().map(|e| (e.count, e.filtered_count)).collect();
        assert_eq!(a, vec![(Some(10), Some(3)), (Some(5), Some(0))]);
    }

    #[test]
    fn test_merge_uses_carried_ids() {
        // response order follows the request's column ids, not the map's order
        let (mut state, _) = state(&[("A", 1), ("B", 1)]);
        let ids = vec!["B".to_string(), "A".to_string()];
        merge_counts(&mut state, &ids, &[vec![7], vec![9]], true).unwrap();
        assert_eq!(state["A"][0].count, Some(9));
        assert_eq!(state["B"][0].count, Some(7));
    }

    #[test]
    fn test_merge_metrics_null_is_zero() {
        let (mut state, ids) = state(&[("A", 3)]);
        merge_metrics(&mut state, &ids, &[vec![None, Some(0.5), Some(f64::NAN)]]).unwrap();
        let m: Vec<_> = state["A"].iter().map(|e| e.metric).collect();
        assert_eq!(m, vec![Some(0.0), Some(0.5), Some(0.0)]);
    }

    #[test]
    fn test_misaligned_leaves_state_untouched() {
        let (mut state, ids) = state(&[("A", 2), ("B", 3)]);
        let err = merge_counts(&mut state, &ids, &[vec![1, 2], vec![1, 2]], true).unwrap_err();
        match err {
            PipelineError::Misaligned {
                column,
                expected,
                actual,
            } => {
                assert_eq!(column, "B");
                assert_eq!((expected, actual), (3, 2));
            }
            e => panic!("unexpected {e}"),
        }
        assert!(state.values().flatten().all(|e| e.count.is_none()));

        let err = merge_metrics(&mut state, &ids, &[vec![None, None]]).unwrap_err();
        assert!(matches!(err, PipelineError::Misaligned { .. }));
        assert!(state.values().flatten().all(|e| e.metric.is_none()));
    }
}
