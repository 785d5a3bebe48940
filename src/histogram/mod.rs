use std::{collections::HashMap, ops::Deref, sync::Arc};

use ahash::RandomState;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::column::ColumnId;

pub mod merge;

/// A bucket boundary or category as the service sent it. Integers are kept
/// apart from floats so they go back out in requests unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BucketValue {
    Int(i64),
    Number(f64),
    Bool(bool),
    Text(String),
}
impl From<i64> for BucketValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}
impl From<f64> for BucketValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}
impl From<bool> for BucketValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
impl From<&str> for BucketValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One bucket of a column's distribution.
///
/// `bucket`/`bucket_end` are fixed when buckets are resolved; the count and
/// metric stages only ever fill in the remaining fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramEntry {
    pub bucket: BucketValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_end: Option<BucketValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<f64>,
}
impl HistogramEntry {
    pub fn new(bucket: impl Into<BucketValue>) -> Self {
        Self {
            bucket: bucket.into(),
            bucket_end: None,
            count: None,
            filtered_count: None,
            metric: None,
        }
    }

    pub fn range(bucket: f64, bucket_end: f64) -> Self {
        Self {
            bucket_end: Some(BucketValue::Number(bucket_end)),
            ..Self::new(bucket)
        }
    }
}

pub type HistogramState = HashMap<ColumnId, Vec<HistogramEntry>, RandomState>;

/// Handle to the caller-owned histogram mapping.
///
/// Clones share the same map; stages mutate entries through it and hand the
/// same handle back, so the caller never ends up holding a stale copy.
#[derive(Debug, Clone, Default)]
pub struct SharedHistograms(Arc<RwLock<HistogramState>>);
impl Deref for SharedHistograms {
    type Target = RwLock<HistogramState>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl From<HistogramState> for SharedHistograms {
    fn from(value: HistogramState) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }
}
impl SharedHistograms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether both handles point at the same mapping.
    pub fn same_as(&self, other: &SharedHistograms) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn entries(&self, column: &str) -> Option<Vec<HistogramEntry>> {
        self.0.read().get(column).cloned()
    }

    pub fn snapshot(&self) -> HistogramState {
        self.0.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_json() {
        let raw = r#"[{"bucket":0.0,"bucketEnd":0.5},{"bucket":"cat","bucketEnd":null},{"bucket":true}]"#;
        let entries: Vec<HistogramEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(entries[0], HistogramEntry::range(0.0, 0.5));
        assert_eq!(entries[1], HistogramEntry::new("cat"));
        assert_eq!(entries[2].bucket, BucketValue::Bool(true));

        let out = serde_json::to_string(&entries[1]).unwrap();
        assert_eq!(out, r#"{"bucket":"cat"}"#);
    }

    #[test]
    fn test_integer_bucket_kept_exact() {
        let raw = r#"[{"bucket":3,"bucketEnd":9007199254740993},{"bucket":-2.5}]"#;
        let entries: Vec<HistogramEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(entries[0].bucket, BucketValue::Int(3));
        assert_eq!(entries[0].bucket_end, Some(BucketValue::Int(9_007_199_254_740_993)));
        assert_eq!(entries[1].bucket, BucketValue::Number(-2.5));

        let out = serde_json::to_string(&entries[0]).unwrap();
        assert_eq!(out, r#"{"bucket":3,"bucketEnd":9007199254740993}"#);
    }

    #[test]
    fn test_shared_handle() {
        let shared = SharedHistograms::new();
        let other = shared.clone();
        other
            .write()
            .insert("a".to_string(), vec![HistogramEntry::new(1.0)]);
        assert!(shared.same_as(&other));
        assert_eq!(shared.entries("a").map(|e| e.len()), Some(1));
        assert!(!shared.same_as(&SharedHistograms::new()));
    }
}
