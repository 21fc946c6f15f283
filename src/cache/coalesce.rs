// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! At-most-one concurrent computation per key
//!
//! The first caller for a key becomes the leader: its computation is spawned
//! on the tokio runtime and every later caller for the same key registers a
//! responder and waits. When the computation finishes, each responder gets a
//! clone of the result and the key leaves the in-flight table.
//!
//! Because the computation runs on its own task, a caller that drops its
//! future does not cancel work other callers are waiting on, and any cache
//! population the computation performs still happens.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::errors::InFlightAborted;

type Responder<V, E> = oneshot::Sender<Result<V, E>>;
type InFlight<K, V, E> = Arc<Mutex<HashMap<K, Vec<Responder<V, E>>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deduplicates concurrent computations by key
///
/// # Examples
///
/// ```rust,ignore
/// use anchorscan::cache::Coalescer;
///
/// let coalescer: Coalescer<u64, String, MyError> = Coalescer::new();
///
/// // Both calls observe the same result; `expensive` runs once.
/// let (a, b) = tokio::join!(
///     coalescer.run(7, || expensive(7)),
///     coalescer.run(7, || expensive(7)),
/// );
/// ```
pub struct Coalescer<K, V, E> {
    in_flight: InFlight<K, V, E>,
}

impl<K, V, E> Coalescer<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Display + Send + 'static,
    V: Clone + Send + 'static,
    E: Clone + Send + From<InFlightAborted> + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs `work` for `key`, or joins the computation already in flight
    ///
    /// `work` is only invoked by the leader. Its future must be `'static`
    /// because it runs on a spawned task.
    pub async fn run<F, Fut>(&self, key: K, work: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (responder, receiver) = oneshot::channel();

        let leader = match lock(&self.in_flight).entry(key.clone()) {
            Entry::Occupied(mut waiting) => {
                waiting.get_mut().push(responder);
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(vec![responder]);
                true
            }
        };

        if leader {
            let computation = work();
            let guard = InFlightGuard {
                in_flight: Arc::clone(&self.in_flight),
                key: Some(key.clone()),
            };
            tokio::spawn(async move {
                let result = computation.await;
                guard.complete(result);
            });
        } else {
            debug!(key = %key, "Joining in-flight computation");
        }

        match receiver.await {
            Ok(result) => result,
            Err(_) => {
                warn!(key = %key, "In-flight computation ended without a result");
                Err(E::from(InFlightAborted::new(&key)))
            }
        }
    }

    /// Number of keys with a computation currently in flight
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

impl<K, V, E> Default for Coalescer<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Display + Send + 'static,
    V: Clone + Send + 'static,
    E: Clone + Send + From<InFlightAborted> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E> fmt::Debug for Coalescer<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coalescer")
            .field("in_flight", &lock(&self.in_flight).len())
            .finish()
    }
}

/// Removes the key from the in-flight table when the leader task ends
///
/// If the computation panics the guard is dropped without completing, which
/// drops every responder so waiters observe [`InFlightAborted`].
struct InFlightGuard<K: Eq + Hash, V, E> {
    in_flight: InFlight<K, V, E>,
    key: Option<K>,
}

impl<K: Eq + Hash, V: Clone, E: Clone> InFlightGuard<K, V, E> {
    fn complete(mut self, result: Result<V, E>) {
        let Some(key) = self.key.take() else {
            return;
        };
        let responders = lock(&self.in_flight).remove(&key).unwrap_or_default();
        for responder in responders {
            // A waiter that gave up has dropped its receiver
            let _ = responder.send(result.clone());
        }
    }
}

impl<K: Eq + Hash, V, E> Drop for InFlightGuard<K, V, E> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            lock(&self.in_flight).remove(&key);
        }
    }
}
