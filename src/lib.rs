//! Per-column distribution histograms under interactive filtering.
//!
//! Buckets are resolved once per model; counts and an optional per-bucket
//! metric are then requested from a computation service and merged into the
//! caller's histograms as the user changes filters or model selection.
pub mod column;
pub mod config;
pub(crate) mod default;
pub mod errors;
pub mod histogram;
pub mod metric_range;
pub mod metrics;
pub mod pipeline;
pub mod project;
pub mod request;
pub mod service;
pub mod stage;
pub mod util;

pub use column::{Column, ColumnCatalog, ColumnId, ColumnType, DataType};
pub use config::Config;
pub use errors::PipelineError;
pub use histogram::{BucketValue, HistogramEntry, HistogramState, SharedHistograms};
pub use metric_range::MetricRange;
pub use pipeline::{HistogramPipeline, SelectionUpdate};
pub use project::{ActiveProject, ProjectConfig, ProjectContext};
pub use request::{FilterPredicateGroup, HistogramRequest, MetricSelector};
pub use service::ComputationService;
