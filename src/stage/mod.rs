use std::fmt::Display;

use log::{error, warn};

use crate::{errors::PipelineError, histogram::SharedHistograms, pipeline::PipelineContext};

pub mod buckets;
pub mod counts;
pub mod metric;

/// One of the three pipeline phases. Each phase is its own cancellation domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Buckets,
    Counts,
    Metric,
}
impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Buckets => "buckets",
            Stage::Counts => "counts",
            Stage::Metric => "metric",
        };
        f.write_str(name)
    }
}

/// Turn a settled merge into the aggregator result: the caller's own handle on
/// success, `None` for anything that leaves the previous display in place.
pub(crate) fn merge_outcome(
    ctx: &PipelineContext,
    stage: Stage,
    settled: Option<Result<(), PipelineError>>,
    histograms: &SharedHistograms,
) -> Option<SharedHistograms> {
    match settled {
        Some(Ok(())) => {
            ctx.metrics.add_applied(stage);
            Some(histograms.clone())
        }
        Some(Err(e @ PipelineError::Misaligned { .. })) => {
            error!("{} response discarded: {}", stage, e);
            ctx.metrics.add_failed(stage);
            None
        }
        Some(Err(e)) => {
            warn!("{} request failed, keeping previous histograms: {}", stage, e);
            ctx.metrics.add_failed(stage);
            None
        }
        None => {
            ctx.metrics.add_superseded(stage);
            None
        }
    }
}
