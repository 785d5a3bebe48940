use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    column::{Column, ColumnCatalog, ColumnId},
    errors::PipelineError,
    histogram::{HistogramEntry, HistogramState},
};

/// Boolean expression tree over column values. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPredicateGroup(pub Value);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}
impl MetricSelector {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            parameters: None,
        }
    }

    /// The empty name means "no metric requested".
    pub fn none() -> Self {
        Self::new("")
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramColumnRequest {
    pub column: Column,
    pub buckets: Vec<HistogramEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramRequest {
    pub column_requests: Vec<HistogramColumnRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_predicates: Option<FilterPredicateGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
}
impl HistogramRequest {
    pub(crate) fn counts(
        column_requests: Vec<HistogramColumnRequest>,
        filter: Option<&FilterPredicateGroup>,
        items: Option<&[String]>,
    ) -> Self {
        Self {
            column_requests,
            filter_predicates: filter.cloned(),
            model: None,
            metric: None,
            items: items.map(|i| i.to_vec()),
        }
    }

    pub(crate) fn metric(
        column_requests: Vec<HistogramColumnRequest>,
        filter: Option<&FilterPredicateGroup>,
        model: &str,
        metric: &MetricSelector,
        items: Option<&[String]>,
    ) -> Self {
        Self {
            model: Some(model.to_string()),
            metric: Some(metric.clone()),
            ..Self::counts(column_requests, filter, items)
        }
    }
}

/// Pair every histogram column with its catalog metadata and current buckets.
///
/// The returned ids are in the same order as the requests; responses are
/// merged back by that order, never by the map's iteration order.
pub(crate) fn build_column_requests(
    catalog: &ColumnCatalog,
    state: &HistogramState,
) -> Result<(Vec<ColumnId>, Vec<HistogramColumnRequest>), PipelineError> {
    let mut ids = Vec::with_capacity(state.len());
    let mut requests = Vec::with_capacity(state.len());
    for (id, buckets) in state.iter() {
        let column = catalog
            .find(id)
            .ok_or_else(|| PipelineError::ColumnNotFound(id.clone()))?;
        ids.push(id.clone());
        requests.push(HistogramColumnRequest {
            column,
            buckets: buckets.clone(),
        });
    }
    Ok((ids, requests))
}
