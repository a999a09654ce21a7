//! Keyed single-shot timers on the tokio runtime.
//!
//! Arming a key cancels whatever was pending for that key. Keys are independent: re-arming
//! one never touches another.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Duration;

struct PendingTask {
    ticket: u64,
    handle: JoinHandle<()>,
}

pub struct KeyedDebouncer<K> {
    delay: Duration,
    pending: Arc<Mutex<HashMap<K, PendingTask>>>,
    next_ticket: AtomicU64,
}

impl<K> KeyedDebouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_ticket: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn debounce<F>(&self, key: K, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.debounce_with_delay(key, self.delay, task);
    }

    /// Outside a tokio runtime there is nothing to drive the timer, so `task` runs at once.
    pub fn debounce_with_delay<F>(&self, key: K, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            self.cancel(&key);
            task();
            return;
        };

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        let task_key = key.clone();
        let Ok(mut tasks) = self.pending.lock() else {
            tracing::error!("debouncer state poisoned, dropping deferred task");
            return;
        };

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let still_current = match pending.lock() {
                Ok(mut tasks) => match tasks.get(&task_key) {
                    Some(entry) if entry.ticket == ticket => {
                        tasks.remove(&task_key);
                        true
                    }
                    _ => false,
                },
                Err(_) => false,
            };
            if still_current {
                task();
            }
        });

        if let Some(previous) = tasks.insert(key, PendingTask { ticket, handle }) {
            previous.handle.abort();
        }
    }

    /// Returns `true` when a pending task was dropped.
    pub fn cancel(&self, key: &K) -> bool {
        let Ok(mut tasks) = self.pending.lock() else {
            return false;
        };
        match tasks.remove(key) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) -> usize {
        let Ok(mut tasks) = self.pending.lock() else {
            return 0;
        };
        let count = tasks.len();
        for (_, entry) in tasks.drain() {
            entry.handle.abort();
        }
        count
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending
            .lock()
            .map(|tasks| tasks.contains_key(key))
            .unwrap_or(false)
    }
}

impl<K> Drop for KeyedDebouncer<K> {
    fn drop(&mut self) {
        if let Ok(mut tasks) = self.pending.lock() {
            for (_, entry) in tasks.drain() {
                entry.handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let shared = Arc::clone(&hits);
        (hits, move || {
            let shared = Arc::clone(&shared);
            Box::new(move || {
                shared.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_coalesces_into_one_run() {
        let debouncer = KeyedDebouncer::new(Duration::from_millis(500));
        let (hits, task) = counter();

        for _ in 0..5 {
            debouncer.debounce("field", task());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending(&"field"));

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending(&"field"));
    }

    #[tokio::test(start_paused = true)]
    async fn keys_run_independently() {
        let debouncer = KeyedDebouncer::new(Duration::from_millis(500));
        let (hits, task) = counter();

        debouncer.debounce("a", task());
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.debounce("b", task());
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(debouncer.is_pending(&"b"));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let debouncer = KeyedDebouncer::new(Duration::from_millis(500));
        let (hits, task) = counter();

        debouncer.debounce("a", task());
        debouncer.debounce("b", task());
        assert!(debouncer.cancel(&"a"));
        assert!(!debouncer.cancel(&"a"));
        assert_eq!(debouncer.cancel_all(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn runs_immediately_without_runtime() {
        let debouncer = KeyedDebouncer::new(Duration::from_secs(60));
        let (hits, task) = counter();
        debouncer.debounce("a", task());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending(&"a"));
    }
}
