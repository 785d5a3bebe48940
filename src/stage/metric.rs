use std::sync::Arc;

use log::{debug, error, info, warn};
use scopeguard::defer;

use crate::{
    errors::PipelineError,
    histogram::{merge::merge_metrics, SharedHistograms},
    pipeline::PipelineContext,
    request::{build_column_requests, FilterPredicateGroup, HistogramRequest, MetricSelector},
    util::slot::RequestSlot,
};

use super::{merge_outcome, Stage};

/// Stage 3: a per-bucket metric for one model.
pub struct MetricAggregator {
    ctx: Arc<PipelineContext>,
    slot: RequestSlot,
}
impl MetricAggregator {
    pub(crate) fn new(ctx: Arc<PipelineContext>) -> Self {
        Self {
            ctx,
            slot: RequestSlot::new(Stage::Metric),
        }
    }

    /// Fetch the metric of every bucket and merge it into `histograms`.
    ///
    /// No request is made when no metric is selected, no project is active,
    /// or the project has histogram metrics turned off; all of those return
    /// `None` just like a failed or superseded request.
    pub async fn compute(
        &self,
        histograms: &SharedHistograms,
        model: &str,
        metric: &MetricSelector,
        items: Option<&[String]>,
        filter: Option<&FilterPredicateGroup>,
    ) -> Option<SharedHistograms> {
        if metric.is_none() {
            debug!("no metric selected, skipping metric stage");
            self.ctx.metrics.add_skipped(Stage::Metric);
            return None;
        }
        let Some(project) = self.ctx.project.active_project() else {
            warn!("{}", PipelineError::NoProjectSelected);
            self.ctx.metrics.add_skipped(Stage::Metric);
            return None;
        };
        if !project.calculate_histogram_metrics {
            debug!("histogram metrics disabled for project {}", project.uuid);
            self.ctx.metrics.add_skipped(Stage::Metric);
            return None;
        }
        let built = build_column_requests(&self.ctx.catalog, &histograms.read());
        let (columns, column_requests) = match built {
            Ok(r) => r,
            Err(e) => {
                error!("cannot build metric request: {}", e);
                self.ctx.metrics.add_failed(Stage::Metric);
                return None;
            }
        };
        let request = HistogramRequest::metric(column_requests, filter, model, metric, items);
        debug!(
            "requesting metric {:?} of model {:?} for {} columns",
            metric.name,
            model,
            columns.len()
        );

        self.ctx.indicator.begin();
        defer! { self.ctx.indicator.end(); }
        self.ctx.metrics.add_issued(Stage::Metric);

        let settled = self
            .slot
            .issue(
                self.ctx.service.compute_metric(&project.uuid, &request),
                |res| -> Result<(), PipelineError> {
                    let matrix = res?;
                    merge_metrics(&mut histograms.write(), &columns, &matrix)?;
                    if self.ctx.metric_range.observe_first(&matrix) {
                        info!("metric range set to {:?}", self.ctx.metric_range.get());
                    }
                    Ok(())
                },
            )
            .await;
        merge_outcome(&self.ctx, Stage::Metric, settled, histograms)
    }

    pub fn cancel(&self) {
        self.slot.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_occupied()
    }
}
