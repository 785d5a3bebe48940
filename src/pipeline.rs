//! The histogram session: shared collaborators plus the three stages.
//!
//! Buckets have to exist before counts or metrics are asked for; counts and
//! metrics are independent of each other and run concurrently. Each stage
//! keeps at most one request in flight and only ever merges the result of
//! the request it issued last.

use std::{ops::Deref, sync::Arc};

use log::{debug, info};

use crate::{
    column::ColumnCatalog,
    config::Config,
    errors::PipelineError,
    histogram::SharedHistograms,
    metric_range::{MetricRange, MetricRangeCell},
    metrics::PipelineMetrics,
    project::ProjectContext,
    request::{FilterPredicateGroup, MetricSelector},
    service::{http::HttpComputationService, ComputationService},
    stage::{buckets::BucketResolver, counts::CountAggregator, metric::MetricAggregator},
    util::indicator::ComputingIndicator,
};

/// Everything the stages share within one session.
pub struct PipelineContext {
    pub(crate) config: Config,
    pub(crate) project: Arc<dyn ProjectContext>,
    pub(crate) catalog: Arc<ColumnCatalog>,
    pub(crate) service: Arc<dyn ComputationService>,
    pub(crate) indicator: ComputingIndicator,
    pub(crate) metric_range: MetricRangeCell,
    pub(crate) metrics: PipelineMetrics,
}

#[derive(Clone)]
pub struct HistogramPipeline(Arc<PipelineInner>);
pub struct PipelineInner {
    ctx: Arc<PipelineContext>,
    buckets: BucketResolver,
    counts: CountAggregator,
    metric: MetricAggregator,
}
impl Deref for HistogramPipeline {
    type Target = PipelineInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// What a selection change produced; `None` means "keep what is shown".
#[derive(Debug, Clone, Default)]
pub struct SelectionUpdate {
    pub counts: Option<SharedHistograms>,
    pub metric: Option<SharedHistograms>,
}

impl HistogramPipeline {
    pub fn new(
        config: Config,
        project: Arc<dyn ProjectContext>,
        catalog: Arc<ColumnCatalog>,
        service: Arc<dyn ComputationService>,
    ) -> Self {
        let ctx = Arc::new(PipelineContext {
            metrics: PipelineMetrics::new(config.metrics_enabled()),
            config,
            project,
            catalog,
            service,
            indicator: ComputingIndicator::new(),
            metric_range: MetricRangeCell::new(),
        });
        Self(Arc::new(PipelineInner {
            buckets: BucketResolver::new(ctx.clone()),
            counts: CountAggregator::new(ctx.clone()),
            metric: MetricAggregator::new(ctx.clone()),
            ctx,
        }))
    }

    /// Session backed by the JSON-over-HTTP computation service.
    pub fn with_http(
        config: Config,
        project: Arc<dyn ProjectContext>,
        catalog: Arc<ColumnCatalog>,
    ) -> anyhow::Result<Self> {
        config.init()?;
        let service = HttpComputationService::new(&config.http)?;
        Ok(Self::new(config, project, catalog, Arc::new(service)))
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    pub fn indicator(&self) -> ComputingIndicator {
        self.ctx.indicator.clone()
    }

    pub fn metric_range(&self) -> MetricRange {
        self.ctx.metric_range.get()
    }

    /// Let the next metric response pick a fresh display range.
    pub fn reset_metric_range(&self) {
        self.ctx.metric_range.reset();
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.ctx.metrics
    }

    pub fn catalog(&self) -> &ColumnCatalog {
        &self.ctx.catalog
    }

    pub fn buckets(&self) -> &BucketResolver {
        &self.buckets
    }

    pub fn counts(&self) -> &CountAggregator {
        &self.counts
    }

    pub fn metric(&self) -> &MetricAggregator {
        &self.metric
    }

    pub async fn resolve_buckets(&self, model: &str) -> Result<SharedHistograms, PipelineError> {
        self.buckets.resolve(model).await
    }

    pub async fn compute_counts(
        &self,
        histograms: &SharedHistograms,
        filter: Option<&FilterPredicateGroup>,
        items: Option<&[String]>,
    ) -> Option<SharedHistograms> {
        self.counts.compute(histograms, filter, items).await
    }

    pub async fn compute_metric(
        &self,
        histograms: &SharedHistograms,
        model: &str,
        metric: &MetricSelector,
        items: Option<&[String]>,
        filter: Option<&FilterPredicateGroup>,
    ) -> Option<SharedHistograms> {
        self.metric
            .compute(histograms, model, metric, items, filter)
            .await
    }

    /// Filter, item subset or model changed: refresh counts and metric of
    /// already resolved buckets concurrently.
    pub async fn update_selection(
        &self,
        histograms: &SharedHistograms,
        model: &str,
        metric: &MetricSelector,
        filter: Option<&FilterPredicateGroup>,
        items: Option<&[String]>,
    ) -> SelectionUpdate {
        let (counts, metric) = tokio::join!(
            self.counts.compute(histograms, filter, items),
            self.metric.compute(histograms, model, metric, items, filter),
        );
        SelectionUpdate { counts, metric }
    }

    /// Full forward flow for a model: buckets, unfiltered counts, then the
    /// filtered counts and the metric side by side.
    pub async fn refresh(
        &self,
        model: &str,
        metric: &MetricSelector,
        filter: Option<&FilterPredicateGroup>,
        items: Option<&[String]>,
    ) -> Result<SharedHistograms, PipelineError> {
        let histograms = self.resolve_buckets(model).await?;
        info!(
            "resolved buckets for {} columns of model {:?}",
            histograms.read().len(),
            model
        );
        if self.counts.compute(&histograms, None, None).await.is_none() {
            debug!("unfiltered counts unavailable");
        }
        if filter.is_some() || items.is_some() {
            self.update_selection(&histograms, model, metric, filter, items)
                .await;
        } else {
            self.metric
                .compute(&histograms, model, metric, None, None)
                .await;
        }
        Ok(histograms)
    }

    /// Cancel the in-flight request of every stage.
    pub fn cancel_all(&self) {
        self.buckets.cancel();
        self.counts.cancel();
        self.metric.cancel();
    }
}
