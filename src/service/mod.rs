use async_trait::async_trait;

use crate::{
    column::Column,
    histogram::HistogramEntry,
    request::HistogramRequest,
};

pub mod http;

/// Remote service that does the histogram math.
///
/// Dropping a returned future aborts the call; that is the only cancellation
/// the pipeline asks of a transport. Retries, if any, live behind this trait.
#[async_trait]
pub trait ComputationService: Send + Sync {
    /// Bucket definitions, one list per requested column, in request order.
    async fn resolve_buckets(
        &self,
        project: &str,
        columns: &[Column],
    ) -> anyhow::Result<Vec<Vec<HistogramEntry>>>;

    /// Per-column, per-bucket counts, in `column_requests` order.
    async fn compute_counts(
        &self,
        project: &str,
        request: &HistogramRequest,
    ) -> anyhow::Result<Vec<Vec<u64>>>;

    /// Per-column, per-bucket metric values; a bucket without data may be `None`.
    async fn compute_metric(
        &self,
        project: &str,
        request: &HistogramRequest,
    ) -> anyhow::Result<Vec<Vec<Option<f64>>>>;
}
