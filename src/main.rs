use std::{fs, path::PathBuf, sync::Arc};

use anyhow::anyhow;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use histopipe::{
    ActiveProject, Column, ColumnCatalog, Config, FilterPredicateGroup, HistogramPipeline,
    MetricSelector, ProjectConfig,
};

/// Compute histograms for a project once and print them as JSON.
#[derive(Parser, Debug)]
#[command(name = "histopipe", version, about)]
struct Cli {
    /// Base URL of the computation service API.
    #[arg(long, default_value = "http://localhost:8000/api")]
    base_url: String,

    /// Project uuid.
    #[arg(long)]
    project: String,

    /// JSON file holding the project's column list.
    #[arg(long)]
    columns: PathBuf,

    /// Model whose columns and metric are shown.
    #[arg(long, default_value = "")]
    model: String,

    /// Metric to compute per bucket; empty for none.
    #[arg(long, default_value = "")]
    metric: String,

    /// JSON file holding a filter predicate group.
    #[arg(long)]
    filter: Option<PathBuf>,

    /// Restrict counts and metric to these item ids.
    #[arg(long, value_delimiter = ',')]
    items: Option<Vec<String>>,

    /// Compute per-bucket metrics for this project.
    #[arg(long)]
    calculate_metrics: bool,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| anyhow!("cannot read {:?} : {}", path, e))?;
    serde_json::from_str(&raw).map_err(|e| anyhow!("cannot parse {:?} : {}", path, e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let columns: Vec<Column> = read_json(&cli.columns)?;
    let filter = match &cli.filter {
        Some(path) => Some(FilterPredicateGroup(read_json(path)?)),
        None => None,
    };

    let config = Config::default().set_base_url(&cli.base_url);
    let project = ProjectConfig::new(&cli.project).set_calculate_histogram_metrics(cli.calculate_metrics);
    let pipeline = HistogramPipeline::with_http(
        config,
        Arc::new(ActiveProject::new(Some(project))),
        Arc::new(ColumnCatalog::new(columns)),
    )?;
    tracing::info!(project = %cli.project, model = %cli.model, "computing histograms");

    let histograms = pipeline
        .refresh(
            &cli.model,
            &MetricSelector::new(&cli.metric),
            filter.as_ref(),
            cli.items.as_deref(),
        )
        .await?;

    let out = serde_json::json!({
        "histograms": histograms.snapshot(),
        "metricRange": pipeline.metric_range(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
