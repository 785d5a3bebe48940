use thiserror::Error;

use crate::column::ColumnId;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No project selected.")]
    NoProjectSelected,
    #[error("Column {0:?} not found in column catalog")]
    ColumnNotFound(ColumnId),
    #[error("Response for column {column:?} has {actual} values, histogram has {expected} buckets")]
    Misaligned {
        column: ColumnId,
        expected: usize,
        actual: usize,
    },
    #[error("Request was superseded by a newer request on the same stage")]
    Superseded,
    #[error("Transport error: {0}")]
    Transport(#[from] anyhow::Error),
}
impl PipelineError {
    pub(crate) fn misaligned(column: &str, expected: usize, actual: usize) -> Self {
        Self::Misaligned {
            column: column.to_string(),
            expected,
            actual,
        }
    }
}
