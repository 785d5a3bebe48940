use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// "Histograms are being computed" flag for interactive callers.
///
/// Backed by a count of outstanding requests so that one stage finishing
/// does not clear the flag while another stage is still waiting.
#[derive(Debug, Clone, Default)]
pub struct ComputingIndicator(Arc<AtomicUsize>);
impl ComputingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_computing(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }

    #[inline]
    pub fn in_flight(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    #[inline]
    pub(crate) fn begin(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    #[inline]
    pub(crate) fn end(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}
