//! # Debounce Scheduler
//!
//! Coalesces bursts of events for one key into a single deferred action.
//!
//! ## Timeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Debounce (window = 2000 ms)                        │
//! │                                                                         │
//! │  t=0     schedule(k, a1)   ──► timer armed, fires at t=2000            │
//! │  t=500   schedule(k, a2)   ──► a1 aborted, timer re-armed → t=2500     │
//! │  t=2500  timer fires       ──► a2 runs to completion                   │
//! │                                                                         │
//! │  Only the last action registered before the window elapses executes.   │
//! │  Once an action has started it can no longer be cancelled.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each pending action is a tokio task sleeping for the window. Bookkeeping
//! sits behind a `tokio::sync::Mutex`; a waking task claims its slot only if
//! its generation still matches, so a superseded task that raced past its
//! sleep exits without running.
//!
//! State is per process. Two engine instances behind one state store do not
//! coordinate their timers.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

struct PendingAction {
    generation: u64,
    task: JoinHandle<()>,
}

struct Pending<K> {
    next_generation: u64,
    actions: HashMap<K, PendingAction>,
}

/// Keyed, cancellable deferred actions.
pub struct DebounceScheduler<K> {
    window: Duration,
    pending: Arc<Mutex<Pending<K>>>,
}

impl<K> Clone for DebounceScheduler<K> {
    fn clone(&self) -> Self {
        DebounceScheduler {
            window: self.window,
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<K> DebounceScheduler<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    pub fn new(window: Duration) -> Self {
        DebounceScheduler {
            window,
            pending: Arc::new(Mutex::new(Pending {
                next_generation: 0,
                actions: HashMap::new(),
            })),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replaces any pending action for `key` and re-arms the timer.
    ///
    /// Returns `true` if an earlier pending action was superseded.
    pub async fn schedule(&self, key: K, action: BoxFuture<'static, ()>) -> bool {
        let mut pending = self.pending.lock().await;
        pending.next_generation += 1;
        let generation = pending.next_generation;

        let slots = Arc::clone(&self.pending);
        let window = self.window;
        let task_key = key.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;

            {
                let mut pending = slots.lock().await;
                let current = pending
                    .actions
                    .get(&task_key)
                    .map(|slot| slot.generation);
                if current != Some(generation) {
                    return;
                }
                pending.actions.remove(&task_key);
            }

            debug!(key = ?task_key, "Debounce window elapsed, running action");
            action.await;
        });

        let superseded = match pending
            .actions
            .insert(key.clone(), PendingAction { generation, task })
        {
            Some(previous) => {
                previous.task.abort();
                true
            }
            None => false,
        };

        debug!(key = ?key, superseded, window_ms = window.as_millis() as u64, "Debounce armed");
        superseded
    }

    /// Cancels the pending action for `key`, if any.
    pub async fn cancel(&self, key: &K) -> bool {
        match self.pending.lock().await.actions.remove(key) {
            Some(slot) => {
                slot.task.abort();
                debug!(key = ?key, "Debounce cancelled");
                true
            }
            None => false,
        }
    }

    /// Number of actions still waiting for their window.
    pub async fn pending(&self) -> usize {
        self.pending.lock().await.actions.len()
    }

    pub async fn is_pending(&self, key: &K) -> bool {
        self.pending.lock().await.actions.contains_key(key)
    }

    /// Cancels every pending action. Actions already running are left alone.
    pub async fn shutdown(&self) -> usize {
        let mut pending = self.pending.lock().await;
        let count = pending.actions.len();
        for (_, slot) in pending.actions.drain() {
            slot.task.abort();
        }
        info!(cancelled = count, "Debounce scheduler shut down");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::Mutex as StdMutex;

    const WINDOW: Duration = Duration::from_millis(2_000);

    fn recorder() -> Arc<StdMutex<Vec<&'static str>>> {
        Arc::new(StdMutex::new(Vec::new()))
    }

    fn push(log: &Arc<StdMutex<Vec<&'static str>>>, label: &'static str) -> BoxFuture<'static, ()> {
        let log = Arc::clone(log);
        async move {
            log.lock().unwrap().push(label);
        }
        .boxed()
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_action_runs() {
        let scheduler = DebounceScheduler::new(WINDOW);
        let log = recorder();

        assert!(!scheduler.schedule("k", push(&log, "first")).await);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(scheduler.schedule("k", push(&log, "second")).await);

        // 2000 ms after the first call, but only 1500 ms after the second.
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(log.lock().unwrap().is_empty());
        assert!(scheduler.is_pending(&"k").await);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(*log.lock().unwrap(), vec!["second"]);
        assert_eq!(scheduler.pending().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let scheduler = DebounceScheduler::new(WINDOW);
        let log = recorder();

        scheduler.schedule("a", push(&log, "a")).await;
        scheduler.schedule("b", push(&log, "b")).await;
        assert_eq!(scheduler.pending().await, 2);

        tokio::time::sleep(WINDOW + Duration::from_millis(1)).await;
        let mut ran = log.lock().unwrap().clone();
        ran.sort();
        assert_eq!(ran, vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_shutdown() {
        let scheduler = DebounceScheduler::new(WINDOW);
        let log = recorder();

        scheduler.schedule("a", push(&log, "a")).await;
        scheduler.schedule("b", push(&log, "b")).await;
        scheduler.schedule("c", push(&log, "c")).await;

        assert!(scheduler.cancel(&"a").await);
        assert!(!scheduler.cancel(&"a").await);
        assert_eq!(scheduler.shutdown().await, 2);

        tokio::time::sleep(WINDOW * 2).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescheduling_after_fire_starts_new_cycle() {
        let scheduler = DebounceScheduler::new(WINDOW);
        let log = recorder();

        scheduler.schedule("k", push(&log, "one")).await;
        tokio::time::sleep(WINDOW + Duration::from_millis(1)).await;

        assert!(!scheduler.schedule("k", push(&log, "two")).await);
        tokio::time::sleep(WINDOW + Duration::from_millis(1)).await;

        assert_eq!(*log.lock().unwrap(), vec!["one", "two"]);
    }
}
