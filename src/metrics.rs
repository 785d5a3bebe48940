use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::Serialize;

use crate::stage::Stage;

#[derive(Debug, Default)]
struct StageCounters {
    issued: AtomicUsize,
    applied: AtomicUsize,
    superseded: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}
impl StageCounters {
    fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            issued: self.issued.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageSnapshot {
    pub issued: usize,
    pub applied: usize,
    pub superseded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Per-stage request counters of one pipeline session.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    enabled: AtomicBool,
    buckets: StageCounters,
    counts: StageCounters,
    metric: StageCounters,
}
impl PipelineMetrics {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            ..Default::default()
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    #[inline]
    fn stage(&self, stage: Stage) -> &StageCounters {
        match stage {
            Stage::Buckets => &self.buckets,
            Stage::Counts => &self.counts,
            Stage::Metric => &self.metric,
        }
    }

    #[inline]
    pub(crate) fn add_issued(&self, stage: Stage) {
        if !self.enabled() {
            return;
        }
        self.stage(stage).issued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_applied(&self, stage: Stage) {
        if !self.enabled() {
            return;
        }
        self.stage(stage).applied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_superseded(&self, stage: Stage) {
        if !self.enabled() {
            return;
        }
        self.stage(stage).superseded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_failed(&self, stage: Stage) {
        if !self.enabled() {
            return;
        }
        self.stage(stage).failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_skipped(&self, stage: Stage) {
        if !self.enabled() {
            return;
        }
        self.stage(stage).skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, stage: Stage) -> StageSnapshot {
        self.stage(stage).snapshot()
    }
}
