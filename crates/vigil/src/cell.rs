//! Observable state cells: single-writer, multi-reader state slices.
//!
//! A [`StateCell`] holds the latest fully-constructed value of one state
//! slice. The engine is the only writer; consumers read synchronously via
//! [`StateReader`] or await changes. Built on `tokio::sync::watch`, so
//! `replace` is an atomic swap and readers never observe a torn value.

use std::sync::Arc;
use tokio::sync::watch;

/// A mutable, externally-readable container for one slice of state.
///
/// Created with a default value at engine construction and written only by
/// the engine. Cloning the cell clones a handle to the same slot.
#[derive(Debug, Clone)]
pub struct StateCell<S> {
    tx: Arc<watch::Sender<S>>,
}

impl<S: Clone> StateCell<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Atomically replace the stored value.
    ///
    /// Whole-value replacement only; there is no in-place mutation, so no
    /// reader can see a half-updated value.
    pub fn replace(&self, value: S) {
        self.tx.send_replace(value);
    }

    /// Current value. Synchronous, never blocks, never fails.
    pub fn read(&self) -> S {
        self.tx.borrow().clone()
    }

    /// A read-only handle for the consumer layer.
    pub fn subscribe(&self) -> StateReader<S> {
        StateReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl<S: Clone + Default> Default for StateCell<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Read-only view of a [`StateCell`].
#[derive(Debug, Clone)]
pub struct StateReader<S> {
    rx: watch::Receiver<S>,
}

impl<S: Clone> StateReader<S> {
    /// Current value. Synchronous, never blocks, never fails.
    pub fn get(&self) -> S {
        self.rx.borrow().clone()
    }

    /// Wait until the cell is replaced.
    ///
    /// Returns `false` once the writing engine has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_is_idempotent_between_replaces() {
        let cell = StateCell::new(1u32);
        assert_eq!(cell.read(), 1);
        assert_eq!(cell.read(), 1);

        cell.replace(2);
        assert_eq!(cell.read(), 2);
        assert_eq!(cell.read(), 2);
    }

    #[test]
    fn readers_observe_the_latest_replace() {
        let cell = StateCell::new(String::from("empty"));
        let reader = cell.subscribe();

        cell.replace("loaded".into());
        assert_eq!(reader.get(), "loaded");
        // The writing handle sees the same value.
        assert_eq!(cell.read(), "loaded");
    }

    #[tokio::test]
    async fn changed_wakes_on_replace_and_ends_with_writer() {
        let cell = StateCell::new(0u32);
        let mut reader = cell.subscribe();

        cell.replace(5);
        assert!(reader.changed().await);
        assert_eq!(reader.get(), 5);

        drop(cell);
        assert!(!reader.changed().await);
    }
}
