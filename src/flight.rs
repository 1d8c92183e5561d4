//! Call Deduplication Module
//!
//! Collapses concurrent calls for the same key into one execution whose
//! result is shared by every caller.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;

// == Flight ==
/// Tracks in-flight calls per key.
///
/// The first caller for a key runs the producer; callers that arrive while it
/// runs wait for its result instead of running their own. Once the producer
/// finishes the key is released, so the next call starts a fresh execution.
#[derive(Debug)]
pub struct Flight<T> {
    /// Receivers for the result of each in-flight call
    calls: Mutex<HashMap<String, watch::Receiver<Option<T>>>>,
}

impl<T: Clone> Flight<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    // == Work ==
    /// Runs `producer` unless a call for `key` is already in flight, in which
    /// case the caller waits for that call and receives a clone of its result.
    ///
    /// If the leading call is dropped before finishing, one of the waiters
    /// takes over and runs its own producer.
    pub async fn work<F, Fut>(&self, key: &str, producer: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        loop {
            let (mut rx, leader) = {
                let mut calls = self.calls.lock();
                match calls.get(key) {
                    Some(rx) => (rx.clone(), None),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        calls.insert(key.to_string(), rx.clone());
                        (rx, Some(tx))
                    }
                }
            };

            if let Some(tx) = leader {
                return self.lead(key, tx, producer).await;
            }

            let shared = rx
                .wait_for(Option::is_some)
                .await
                .ok()
                .and_then(|result| (*result).clone());
            if let Some(value) = shared {
                return value;
            }
            tokio::task::yield_now().await;
        }
    }

    /// Returns the number of keys with a call in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    async fn lead<F, Fut>(&self, key: &str, tx: watch::Sender<Option<T>>, producer: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let release = Release { flight: self, key };
        let value = producer().await;
        // Callers arriving from here on start a fresh execution.
        drop(release);
        tx.send_replace(Some(value.clone()));
        value
    }
}

impl<T: Clone> Default for Flight<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the call record when the leader finishes, panics or is dropped.
struct Release<'a, T> {
    flight: &'a Flight<T>,
    key: &'a str,
}

impl<T> Drop for Release<'_, T> {
    fn drop(&mut self) {
        self.flight.calls.lock().remove(self.key);
    }
}
