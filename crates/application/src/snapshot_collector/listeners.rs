use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rolewarden_domain::{CommunityId, MembersChunk};
use tokio::sync::oneshot;

struct ChunkListener {
    community_id: CommunityId,
    nonce: String,
    completion: oneshot::Sender<()>,
}

/// Registry of in-flight membership listings awaiting their last chunk.
#[derive(Default)]
pub struct ChunkListenerRegistry {
    next_listener_id: AtomicU64,
    listeners: Mutex<HashMap<u64, ChunkListener>>,
}

impl ChunkListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals every listener the chunk completes and removes them.
    ///
    /// Returns the number of listeners signaled.
    pub fn observe_chunk(&self, chunk: &MembersChunk) -> usize {
        if !chunk.is_final() {
            return 0;
        }

        let mut listeners = self.lock_listeners();
        let completed: Vec<u64> = listeners
            .iter()
            .filter(|(_, listener)| chunk.answers(&listener.community_id, &listener.nonce))
            .map(|(listener_id, _)| *listener_id)
            .collect();

        completed
            .into_iter()
            .filter_map(|listener_id| listeners.remove(&listener_id))
            .map(|listener| listener.completion.send(()).is_ok())
            .filter(|sent| *sent)
            .count()
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    pub(super) fn register(
        self: &Arc<Self>,
        community_id: CommunityId,
        nonce: String,
    ) -> (ListenerGuard, oneshot::Receiver<()>) {
        let (completion, receiver) = oneshot::channel();
        let listener_id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);

        self.lock_listeners().insert(
            listener_id,
            ChunkListener {
                community_id,
                nonce,
                completion,
            },
        );

        (
            ListenerGuard {
                registry: Arc::clone(self),
                listener_id,
            },
            receiver,
        )
    }

    fn deregister(&self, listener_id: u64) {
        self.lock_listeners().remove(&listener_id);
    }

    fn lock_listeners(&self) -> MutexGuard<'_, HashMap<u64, ChunkListener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes its listener when dropped, however the wait ended.
pub(super) struct ListenerGuard {
    registry: Arc<ChunkListenerRegistry>,
    listener_id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.registry.deregister(self.listener_id);
    }
}
