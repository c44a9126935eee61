//! Subscriber-side handles onto store state.
//!
//! A `View` is a `watch` receiver: cloning it subscribes again, dropping it unsubscribes.
//! A `Pending` is the one-shot terminal result of a single store mutation.

use crate::domain::{DataStatus, DomainError};
use tokio::sync::{oneshot, watch};

#[derive(Debug, Clone)]
pub struct View<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> View<T> {
    pub(crate) fn new(rx: watch::Receiver<T>) -> Self {
        Self { rx }
    }

    /// Current value, without waiting.
    pub fn snapshot(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next publish. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl<T: Clone> View<DataStatus<T>> {
    /// Wait until the view leaves `loading`, then return that state.
    /// Returns immediately when nothing is in flight.
    pub async fn settled(&mut self) -> DataStatus<T> {
        let settled = self
            .rx
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone());
        match settled {
            Ok(state) => state,
            Err(_) => self.rx.borrow().clone(),
        }
    }
}

/// Terminal result of one mutation. Resolves exactly once.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<DataStatus<T>>,
}

impl<T: Default> Pending<T> {
    pub(crate) fn new(rx: oneshot::Receiver<DataStatus<T>>) -> Self {
        Self { rx }
    }

    pub async fn outcome(self) -> DataStatus<T> {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => DataStatus::failure(
                T::default(),
                DomainError::Unavailable("mutation dropped before completion".to_string()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;

    #[tokio::test]
    async fn test_settled_returns_immediately_when_idle() {
        let (_tx, rx) = watch::channel(DataStatus::never(0u8));
        let mut view = View::new(rx);
        assert_eq!(view.settled().await.status(), Status::Never);
    }

    #[tokio::test]
    async fn test_settled_waits_for_terminal_state() {
        let (tx, rx) = watch::channel(DataStatus::loading(0u8));
        let mut view = View::new(rx);
        tokio::spawn(async move {
            tx.send_replace(DataStatus::success(5));
        });
        let state = view.settled().await;
        assert!(state.is_success());
        assert_eq!(*state.data(), 5);
    }

    #[tokio::test]
    async fn test_pending_reports_dropped_mutation() {
        let (tx, rx) = oneshot::channel::<DataStatus<Option<u8>>>();
        drop(tx);
        let outcome = Pending::new(rx).outcome().await;
        assert_eq!(outcome.status(), Status::Error);
        assert!(outcome.data().is_none());
    }
}
