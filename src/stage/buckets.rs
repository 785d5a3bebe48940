use std::sync::Arc;

use log::debug;
use scopeguard::defer;

use crate::{
    column::Column,
    errors::PipelineError,
    histogram::{HistogramState, SharedHistograms},
    pipeline::PipelineContext,
    util::slot::RequestSlot,
};

use super::Stage;

/// Stage 1: obtain bucket definitions for every column relevant to a model.
pub struct BucketResolver {
    ctx: Arc<PipelineContext>,
    slot: RequestSlot,
}
impl BucketResolver {
    pub(crate) fn new(ctx: Arc<PipelineContext>) -> Self {
        Self {
            ctx,
            slot: RequestSlot::new(Stage::Buckets),
        }
    }

    /// Columns that get a histogram for `model`: identifier-only columns and
    /// columns owned by another model are left out. Catalog order is kept.
    pub fn select_columns(columns: &[Column], model: &str) -> Vec<Column> {
        columns
            .iter()
            .filter(|c| !c.column_type.is_identifier() && c.visible_for(model))
            .cloned()
            .collect()
    }

    pub async fn resolve(&self, model: &str) -> Result<SharedHistograms, PipelineError> {
        let project = self
            .ctx
            .project
            .active_project()
            .ok_or(PipelineError::NoProjectSelected)?;
        let columns = Self::select_columns(&self.ctx.catalog.columns(), model);
        debug!(
            "resolving buckets of {} columns for model {:?}",
            columns.len(),
            model
        );

        self.ctx.indicator.begin();
        defer! { self.ctx.indicator.end(); }
        self.ctx.metrics.add_issued(Stage::Buckets);

        let settled = self
            .slot
            .issue(
                self.ctx.service.resolve_buckets(&project.uuid, &columns),
                |res| -> Result<SharedHistograms, PipelineError> {
                    let buckets = res?;
                    if buckets.len() != columns.len() {
                        let column = columns
                            .get(buckets.len())
                            .map(|c| c.id.as_str())
                            .unwrap_or_default();
                        return Err(PipelineError::misaligned(
                            column,
                            columns.len(),
                            buckets.len(),
                        ));
                    }
                    let state: HistogramState = columns
                        .iter()
                        .map(|c| c.id.clone())
                        .zip(buckets)
                        .collect();
                    Ok(state.into())
                },
            )
            .await;

        match settled {
            Some(Ok(histograms)) => {
                self.ctx.metrics.add_applied(Stage::Buckets);
                Ok(histograms)
            }
            Some(Err(e)) => {
                self.ctx.metrics.add_failed(Stage::Buckets);
                Err(e)
            }
            None => {
                self.ctx.metrics.add_superseded(Stage::Buckets);
                Err(PipelineError::Superseded)
            }
        }
    }

    pub fn cancel(&self) {
        self.slot.cancel();
    }
}
