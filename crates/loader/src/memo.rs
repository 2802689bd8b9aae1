use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Keyed store of pending or finished computations.
///
/// The first caller for a key runs the computation; callers arriving while it
/// is in flight wait for the same result instead of starting another one.
/// Entries are never evicted or refreshed, failures included.
pub struct Memo<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Value for `key`, running `init` only if no caller has started it yet
    pub async fn get_or_init<F, Fut>(&self, key: &K, init: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = {
            // never held across an await
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            cells.entry(key.clone()).or_default().clone()
        };
        cell.get_or_init(init).await.clone()
    }

    /// Finished value for `key`, if any
    pub fn get(&self, key: &K) -> Option<V> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of keys ever requested
    pub fn len(&self) -> usize {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for Memo<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_share_one_run() {
        let memo: Memo<String, usize> = Memo::new();
        let runs = AtomicUsize::new(0);
        let runs = &runs;
        let key = "k".to_string();

        let init = move || async move {
            runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            42
        };

        let (a, b, c) = tokio::join!(
            memo.get_or_init(&key, init),
            memo.get_or_init(&key, init),
            memo.get_or_init(&key, init),
        );
        assert_eq!((a, b, c), (42, 42, 42));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(memo.get(&key), Some(42));
    }

    #[tokio::test]
    async fn failures_are_kept() {
        let memo: Memo<&'static str, Result<u8, String>> = Memo::new();
        let first = memo.get_or_init(&"k", || async { Err("boom".to_string()) }).await;
        let second = memo.get_or_init(&"k", || async { Ok(1) }).await;
        assert_eq!(first, Err("boom".to_string()));
        assert_eq!(second, first);
        assert_eq!(memo.len(), 1);
    }

    #[tokio::test]
    async fn distinct_keys_run_separately() {
        let memo: Memo<u32, u32> = Memo::new();
        assert_eq!(memo.get_or_init(&1, || async { 10 }).await, 10);
        assert_eq!(memo.get_or_init(&2, || async { 20 }).await, 20);
        assert_eq!(memo.get(&3), None);
    }
}
