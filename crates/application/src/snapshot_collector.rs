use std::sync::Arc;
use std::time::Duration;

use rolewarden_core::{AppError, AppResult};
use rolewarden_domain::{CommunityId, MemberSnapshot};
use tracing::debug;
use uuid::Uuid;

use crate::PlatformSession;

mod listeners;

pub use listeners::ChunkListenerRegistry;

/// Requests a full membership listing and waits for its last chunk.
#[derive(Clone)]
pub struct MembershipSnapshotCollector {
    session: Arc<dyn PlatformSession>,
    listeners: Arc<ChunkListenerRegistry>,
    timeout: Duration,
}

impl MembershipSnapshotCollector {
    /// Creates a collector bounded by `timeout` per listing.
    #[must_use]
    pub fn new(
        session: Arc<dyn PlatformSession>,
        listeners: Arc<ChunkListenerRegistry>,
        timeout: Duration,
    ) -> Self {
        Self {
            session,
            listeners,
            timeout,
        }
    }

    /// Returns the registry member chunks must be reported to.
    #[must_use]
    pub fn listeners(&self) -> Arc<ChunkListenerRegistry> {
        Arc::clone(&self.listeners)
    }

    /// Collects the complete membership roster of one community.
    ///
    /// Blocks until the final chunk is observed, an empty listing is
    /// announced, or the timeout elapses.
    pub async fn collect(&self, community_id: &CommunityId) -> AppResult<Vec<MemberSnapshot>> {
        let nonce = Uuid::new_v4().simple().to_string();
        let (guard, completion) = self
            .listeners
            .register(community_id.clone(), nonce.clone());

        self.session
            .request_membership_chunks(community_id, nonce.as_str())
            .await?;
        debug!(community_id = %community_id, nonce = %nonce, "requested membership chunks");

        let outcome = tokio::time::timeout(self.timeout, completion).await;
        drop(guard);

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                return Err(AppError::Internal(format!(
                    "membership listener for community '{community_id}' closed before completion"
                )));
            }
            Err(_) => {
                return Err(AppError::Timeout(format!(
                    "membership listing for community '{community_id}' did not complete within {}s",
                    self.timeout.as_secs()
                )));
            }
        }

        self.session.cached_members(community_id).await
    }
}
