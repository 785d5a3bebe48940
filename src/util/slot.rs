use std::{
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
};

use log::debug;
use parking_lot::Mutex;
use scopeguard::defer;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::stage::Stage;

/// Single-occupancy holder for the in-flight request of one stage.
///
/// Every issued request captures a generation number. A result is only
/// handed to `settle` while its generation is still the slot's current one,
/// and `settle` runs under the slot lock, so a newer `issue` can never
/// interleave with the merge of an older result.
#[derive(Debug)]
pub struct RequestSlot {
    stage: Stage,
    generation: AtomicU64,
    current: Mutex<Option<Occupant>>,
}
#[derive(Debug)]
struct Occupant {
    generation: u64,
    cancel: CancellationToken,
}
impl RequestSlot {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Cancel the occupant (if any) and run `op` as the new occupant.
    ///
    /// Returns `None` when `op` was superseded before `settle` could run;
    /// a superseded result is dropped without being looked at.
    pub async fn issue<T, R, F>(&self, op: F, settle: impl FnOnce(T) -> R) -> Option<R>
    where
        F: Future<Output = T>,
    {
        let cancel = CancellationToken::new();
        let generation = {
            let mut current = self.current.lock();
            if let Some(prev) = current.take() {
                debug!(
                    "{} request #{} cancelled by a newer request",
                    self.stage, prev.generation
                );
                prev.cancel.cancel();
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *current = Some(Occupant {
                generation,
                cancel: cancel.clone(),
            });
            generation
        };
        debug!("{} request #{} issued", self.stage, generation);
        // the caller may drop this future mid-await; leave no occupant behind
        defer! {
            let mut current = self.current.lock();
            if matches!(current.as_ref(), Some(o) if o.generation == generation) {
                *current = None;
            }
        }

        let out = select! {
            biased;
            _ = cancel.cancelled() => None,
            out = op => Some(out),
        };

        let mut current = self.current.lock();
        let still_current = matches!(current.as_ref(), Some(o) if o.generation == generation);
        if !still_current {
            debug!("{} request #{} discarded", self.stage, generation);
            return None;
        }
        *current = None;
        out.map(settle)
    }

    /// Cancel whatever occupies the slot. Safe to call on an empty slot.
    pub fn cancel(&self) {
        if let Some(prev) = self.current.lock().take() {
            debug!("{} request #{} cancelled", self.stage, prev.generation);
            prev.cancel.cancel();
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Generation of the most recently issued request.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
