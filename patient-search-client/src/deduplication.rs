use dashmap::{mapref::entry::Entry, DashMap};
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::watch;

/// In-flight marker: followers watch it until the leader publishes.
type PendingRequest<V> = watch::Receiver<Option<V>>;

enum Role<V> {
    Leader(watch::Sender<Option<V>>),
    Follower(PendingRequest<V>),
}

/// Removes the in-flight marker however the leading request ends.
struct PendingGuard<'a, K: Eq + Hash, V> {
    pending: &'a DashMap<K, PendingRequest<V>>,
    key: K,
}

impl<K: Eq + Hash, V> Drop for PendingGuard<'_, K, V> {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}

/// Request deduplication system.
/// When several identical requests overlap, only the first one runs
/// and its result is shared with every request that arrived meanwhile.
pub struct RequestDeduplicator<K: Eq + Hash, V> {
    pending_searches: DashMap<K, PendingRequest<V>>,
}

impl<K: Eq + Hash, V> Default for RequestDeduplicator<K, V> {
    fn default() -> Self {
        Self {
            pending_searches: DashMap::new(),
        }
    }
}

impl<K, V> RequestDeduplicator<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` for `key`, unless a run for the same key is already in
    /// progress, in which case wait for that run's result instead.
    pub async fn execute<F, Fut>(&self, key: K, work: F) -> Result<V, DeduplicationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        // Checking for and registering the marker is a single map operation.
        let role = match self.pending_searches.entry(key.clone()) {
            Entry::Occupied(entry) => Role::Follower(entry.get().clone()),
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(None);
                entry.insert(rx);
                Role::Leader(tx)
            }
        };

        match role {
            Role::Follower(mut rx) => {
                log::debug!("Request already pending for key: {:?}", key);
                let result = rx
                    .wait_for(Option::is_some)
                    .await
                    .map_err(|_| DeduplicationError::LeaderDropped)?;
                log::debug!("Received deduplicated result for key: {:?}", key);
                result.clone().ok_or(DeduplicationError::LeaderDropped)
            }
            Role::Leader(tx) => {
                log::debug!("Executing new request for key: {:?}", key);
                let _guard = PendingGuard {
                    pending: &self.pending_searches,
                    key,
                };
                let result = work().await;
                tx.send_replace(Some(result.clone()));
                Ok(result)
            }
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending_searches.contains_key(key)
    }

    /// Get statistics about pending requests
    pub fn stats(&self) -> DeduplicationStats {
        DeduplicationStats {
            pending_requests: self.pending_searches.len(),
        }
    }
}

/// Statistics for request deduplication
#[derive(Debug, Clone, Copy)]
pub struct DeduplicationStats {
    pub pending_requests: usize,
}

/// Errors that can occur while waiting on a deduplicated request
#[derive(Debug, thiserror::Error)]
pub enum DeduplicationError {
    #[error("Leading request was dropped before producing a result")]
    LeaderDropped,
}

/// Thread-safe wrapper for the deduplicator
pub type SharedRequestDeduplicator<K, V> = Arc<RequestDeduplicator<K, V>>;
