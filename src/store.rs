//! Reducer-backed state holder for screen controllers.
//!
//! A [`Store`] owns the single current state value of a screen and a
//! separate one-shot side-effect channel:
//! - State is published through a [`watch`] channel, so every subscriber
//!   sees the latest snapshot immediately and intermediate values may be
//!   skipped.
//! - Side effects go through a bounded [`mpsc`] channel with exactly one
//!   receiver. Nothing is stored, so a late subscriber never sees an effect
//!   that was already delivered.
//!
//! All writes go through [`Store::reduce`], which replaces the state under
//! the channel's lock. Concurrent reducers are serialized and observers
//! never see a partially applied update. The cancellation check runs under
//! the same lock, and [`Store::close`] cancels under it too.

use std::sync::{Mutex, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Buffered side effects before posting waits for the subscriber.
const SIDE_EFFECT_CAPACITY: usize = 64;

pub struct Store<S, E> {
    state_tx: watch::Sender<S>,
    effect_tx: mpsc::Sender<E>,
    effect_rx: Mutex<Option<mpsc::Receiver<E>>>,
    cancellation_token: CancellationToken,
}

impl<S, E> Store<S, E> {
    /// Create a store seeded with `initial`.
    ///
    /// Once `cancellation_token` is cancelled the store ignores every
    /// further reduction and side effect. Cancel through [`Store::close`]
    /// to also fence off writes that are already in progress.
    pub fn new(initial: S, cancellation_token: CancellationToken) -> Self {
        let (state_tx, _) = watch::channel(initial);
        let (effect_tx, effect_rx) = mpsc::channel(SIDE_EFFECT_CAPACITY);
        Self {
            state_tx,
            effect_tx,
            effect_rx: Mutex::new(Some(effect_rx)),
            cancellation_token,
        }
    }

    /// Replace the current state with `reducer(current)`.
    ///
    /// Returns `false` if the store is closed and the reducer was not run.
    pub fn reduce(&self, reducer: impl FnOnce(&S) -> S) -> bool {
        self.state_tx.send_if_modified(|state| {
            if self.cancellation_token.is_cancelled() {
                return false;
            }
            *state = reducer(state);
            true
        })
    }

    /// Cancel the store's scope.
    ///
    /// Cancellation happens under the state lock, so once this returns no
    /// reduction or side effect can land, even from a task still running
    /// on another worker.
    pub fn close(&self) {
        self.state_tx.send_if_modified(|_| {
            self.cancellation_token.cancel();
            false
        });
    }

    /// Subscribe to state changes. The receiver starts at the latest value.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> S
    where
        S: Clone,
    {
        self.state_tx.borrow().clone()
    }

    /// Deliver a one-shot side effect to the subscriber.
    ///
    /// Waits while the buffer is full. Effects posted after the store is
    /// closed, or after the subscriber went away, are dropped.
    pub async fn post_side_effect(&self, effect: E) {
        let permit = tokio::select! {
            () = self.cancellation_token.cancelled() => return,
            permit = self.effect_tx.reserve() => permit,
        };
        let Ok(permit) = permit else {
            debug!("Side effect dropped, no subscriber");
            return;
        };
        self.state_tx.send_if_modified(|_| {
            if !self.cancellation_token.is_cancelled() {
                permit.send(effect);
            }
            false
        });
    }

    /// Take the side-effect receiver. Only the first caller gets it.
    pub fn take_side_effects(&self) -> Option<mpsc::Receiver<E>> {
        self.effect_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Effect {
        Ping,
        Pong,
    }

    fn store(initial: u32) -> (Store<u32, Effect>, CancellationToken) {
        let token = CancellationToken::new();
        (Store::new(initial, token.clone()), token)
    }

    #[test]
    fn test_reduce_replaces_state() {
        let (store, _token) = store(1);
        assert!(store.reduce(|n| n + 1));
        assert_eq!(store.current(), 2);
    }

    #[test]
    fn test_new_subscriber_sees_latest_value() {
        let (store, _token) = store(0);
        store.reduce(|_| 7);
        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), 7);
    }

    #[test]
    fn test_reduce_is_ignored_after_close() {
        let (store, token) = store(3);
        token.cancel();
        assert!(!store.reduce(|_| 99));
        assert_eq!(store.current(), 3);
    }

    #[test]
    fn test_side_effects_can_only_be_taken_once() {
        let (store, _token) = store(0);
        assert!(store.take_side_effects().is_some());
        assert!(store.take_side_effects().is_none());
    }

    #[tokio::test]
    async fn test_side_effects_arrive_in_order() {
        let (store, _token) = store(0);
        let mut effects = store.take_side_effects().unwrap();
        store.post_side_effect(Effect::Ping).await;
        store.post_side_effect(Effect::Pong).await;
        assert_eq!(effects.recv().await, Some(Effect::Ping));
        assert_eq!(effects.recv().await, Some(Effect::Pong));
        assert!(effects.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_side_effects_are_dropped_after_close() {
        let (store, token) = store(0);
        let mut effects = store.take_side_effects().unwrap();
        token.cancel();
        store.post_side_effect(Effect::Ping).await;
        drop(store);
        assert_eq!(effects.recv().await, None);
    }

    #[test]
    fn test_close_rejects_later_reductions() {
        let (store, token) = store(3);
        store.close();
        assert!(token.is_cancelled());
        assert!(!store.reduce(|_| 99));
        assert_eq!(store.current(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_reduction_lands_after_close() {
        let (store, _token) = store(0);
        let store = Arc::new(store);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    while store.reduce(|n| n + 1) {
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        store.close();
        let at_close = store.current();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.current(), at_close);
    }

    #[tokio::test]
    async fn test_pending_side_effect_is_dropped_on_close() {
        let (store, _token) = store(0);
        let store = Arc::new(store);
        let mut effects = store.take_side_effects().unwrap();
        for _ in 0..SIDE_EFFECT_CAPACITY {
            store.post_side_effect(Effect::Ping).await;
        }

        let blocked = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.post_side_effect(Effect::Pong).await }
        });
        tokio::task::yield_now().await;
        store.close();
        blocked.await.unwrap();

        drop(store);
        let mut received = Vec::new();
        while let Some(effect) = effects.recv().await {
            received.push(effect);
        }
        assert_eq!(received, vec![Effect::Ping; SIDE_EFFECT_CAPACITY]);
    }

    #[tokio::test]
    async fn test_concurrent_reducers_do_not_lose_updates() {
        let (store, _token) = store(0);
        let store = Arc::new(store);
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    for _ in 0..100 {
                        store.reduce(|n| n + 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.current(), 1600);
    }
}
