use std::sync::Arc;

use log::{debug, error, warn};
use scopeguard::defer;

use crate::{
    errors::PipelineError,
    histogram::{merge::merge_counts, SharedHistograms},
    pipeline::PipelineContext,
    request::{build_column_requests, FilterPredicateGroup, HistogramRequest},
    util::slot::RequestSlot,
};

use super::{merge_outcome, Stage};

/// Stage 2: per-bucket counts for already resolved buckets.
///
/// A user may change the selection before the counts arrive, so only the
/// latest request is ever merged; older ones are cancelled on issue.
pub struct CountAggregator {
    ctx: Arc<PipelineContext>,
    slot: RequestSlot,
}
impl CountAggregator {
    pub(crate) fn new(ctx: Arc<PipelineContext>) -> Self {
        Self {
            ctx,
            slot: RequestSlot::new(Stage::Counts),
        }
    }

    /// Fetch counts and merge them into `histograms`.
    ///
    /// `filtered_count` is always updated; `count` only when `filter` is
    /// `None`. Returns the same handle on success and `None` when nothing was
    /// merged (no project, transport failure, superseded), in which case the
    /// previous values stay as they are.
    pub async fn compute(
        &self,
        histograms: &SharedHistograms,
        filter: Option<&FilterPredicateGroup>,
        items: Option<&[String]>,
    ) -> Option<SharedHistograms> {
        let Some(project) = self.ctx.project.active_project() else {
            warn!("{}", PipelineError::NoProjectSelected);
            self.ctx.metrics.add_skipped(Stage::Counts);
            return None;
        };
        let built = build_column_requests(&self.ctx.catalog, &histograms.read());
        let (columns, column_requests) = match built {
            Ok(r) => r,
            Err(e) => {
                error!("cannot build count request: {}", e);
                self.ctx.metrics.add_failed(Stage::Counts);
                return None;
            }
        };
        let unfiltered = filter.is_none();
        let request = HistogramRequest::counts(column_requests, filter, items);
        debug!(
            "requesting counts for {} columns (filtered: {})",
            columns.len(),
            !unfiltered
        );

        self.ctx.indicator.begin();
        defer! { self.ctx.indicator.end(); }
        self.ctx.metrics.add_issued(Stage::Counts);

        let settled = self
            .slot
            .issue(
                self.ctx.service.compute_counts(&project.uuid, &request),
                |res| -> Result<(), PipelineError> {
                    let matrix = res?;
                    merge_counts(&mut histograms.write(), &columns, &matrix, unfiltered)
                },
            )
            .await;
        merge_outcome(&self.ctx, Stage::Counts, settled, histograms)
    }

    pub fn cancel(&self) {
        self.slot.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_occupied()
    }
}
