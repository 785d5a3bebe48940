pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub(crate) const DEFAULT_USER_AGENT: &str = concat!("histopipe/", env!("CARGO_PKG_VERSION"));

pub(crate) const BUCKETS_PATH: &str = "histogram-buckets";
pub(crate) const COUNTS_PATH: &str = "histogram-counts";
pub(crate) const METRICS_PATH: &str = "histogram-metrics";
