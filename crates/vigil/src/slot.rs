//! Named single-occupancy slots for in-flight asynchronous work.
//!
//! Each logical operation (say `"fetch-list"`) owns one slot. Starting
//! work in an occupied slot cancels the previous occupant first: last
//! start wins. Without this, a stale fetch from a rapid pull-to-refresh
//! could race a newer fetch and overwrite fresher state with older data.
//!
//! Cancellation is cooperative and, on its own, best-effort: a cancelled
//! task's in-flight callback may still be about to write. The race is
//! closed at the write site: slot work receives a [`Liveness`] token and
//! routes every cell write through it, so late writes from a superseded
//! task are dropped rather than applied.

use std::future::Future;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cell::StateCell;

/// Registry of named task slots.
///
/// Every slot token is a child of the root token handed in at
/// construction, so tearing down the owner cancels all outstanding work.
#[derive(Debug)]
pub struct TaskSlots {
    root: CancellationToken,
    slots: DashMap<&'static str, CancellationToken>,
}

impl TaskSlots {
    pub fn new(root: CancellationToken) -> Self {
        Self {
            root,
            slots: DashMap::new(),
        }
    }

    /// Cancel the current occupant of `key` (if any), then spawn `work`
    /// as the new occupant.
    ///
    /// Returns nothing: failures inside `work` travel through `Resource`
    /// envelopes into state cells, never back to the caller.
    pub fn start<F, Fut>(&self, key: &'static str, work: F)
    where
        F: FnOnce(Liveness) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if let Some((_, prev)) = self.slots.remove(key) {
            debug!(slot = key, "superseding in-flight task");
            prev.cancel();
        }

        let token = self.root.child_token();
        self.slots.insert(key, token.clone());

        let fut = work(Liveness {
            token: token.clone(),
        });
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = fut => {}
            }
        });
    }

    /// Cooperatively cancel the occupant of `key`, if any.
    pub fn cancel(&self, key: &'static str) {
        if let Some((_, token)) = self.slots.remove(key) {
            debug!(slot = key, "cancelling task");
            token.cancel();
        }
    }
}

/// Per-start marker owned by one slot occupant.
///
/// Invalidated when the occupant is superseded or cancelled, or when the
/// root scope shuts down. All cell writes from slot work go through
/// [`Liveness::write`].
#[derive(Debug, Clone)]
pub struct Liveness {
    token: CancellationToken,
}

impl Liveness {
    /// Whether this start is still the slot's current occupant.
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Replace the cell's value, unless this start has been superseded.
    ///
    /// Returns whether the write landed. Suppressed writes are silent:
    /// a superseded operation is discarded work, not an error.
    pub fn write<S: Clone>(&self, cell: &StateCell<S>, value: S) -> bool {
        if self.is_live() {
            cell.replace(value);
            true
        } else {
            false
        }
    }

    /// Resolves when this start is cancelled or superseded.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn slots() -> TaskSlots {
        TaskSlots::new(CancellationToken::new())
    }

    #[tokio::test(start_paused = true)]
    async fn last_start_wins_even_when_the_loser_finishes_later() {
        let slots = slots();
        let cell = StateCell::new(0u32);

        // Slow task: wants to write 1 after 50ms.
        let slow = cell.clone();
        slots.start("unit", move |live| async move {
            sleep(Duration::from_millis(50)).await;
            live.write(&slow, 1);
        });

        // Fast task started later: writes 2 after 10ms.
        let fast = cell.clone();
        slots.start("unit", move |live| async move {
            sleep(Duration::from_millis(10)).await;
            live.write(&fast, 2);
        });

        sleep(Duration::from_millis(100)).await;
        assert_eq!(cell.read(), 2, "superseded write must not land");
    }

    #[test]
    fn write_site_check_drops_the_value_after_cancellation() {
        let token = CancellationToken::new();
        let live = Liveness {
            token: token.clone(),
        };
        let cell = StateCell::new(1u32);

        assert!(live.write(&cell, 2));
        token.cancel();
        assert!(!live.write(&cell, 3));
        assert_eq!(cell.read(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_late_writes() {
        let slots = slots();
        let cell = StateCell::new(String::from("fresh"));

        let target = cell.clone();
        slots.start("unit", move |live| async move {
            sleep(Duration::from_millis(20)).await;
            live.write(&target, "stale".into());
        });

        slots.cancel("unit");
        sleep(Duration::from_millis(50)).await;
        assert_eq!(cell.read(), "fresh");
    }

    #[tokio::test(start_paused = true)]
    async fn independent_slots_do_not_interfere() {
        let slots = slots();
        let a = StateCell::new(0u32);
        let b = StateCell::new(0u32);

        let wa = a.clone();
        slots.start("a", move |live| async move {
            live.write(&wa, 1);
        });
        let wb = b.clone();
        slots.start("b", move |live| async move {
            live.write(&wb, 2);
        });

        sleep(Duration::from_millis(1)).await;
        assert_eq!(a.read(), 1);
        assert_eq!(b.read(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn root_shutdown_cancels_every_slot() {
        let root = CancellationToken::new();
        let slots = TaskSlots::new(root.clone());
        let cell = StateCell::new(0u32);

        let target = cell.clone();
        slots.start("unit", move |live| async move {
            sleep(Duration::from_millis(20)).await;
            live.write(&target, 9);
        });

        root.cancel();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(cell.read(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_restarts_only_the_final_start_lands() {
        let slots = slots();
        let cell = StateCell::new(0u32);

        for n in 1..=20u32 {
            let target = cell.clone();
            // Random in-flight delay so earlier tasks may finish after
            // later ones start.
            let delay = Duration::from_millis(fastrand::u64(1..30));
            slots.start("unit", move |live| async move {
                sleep(delay).await;
                live.write(&target, n);
            });
        }

        sleep(Duration::from_millis(100)).await;
        assert_eq!(cell.read(), 20);
    }
}
