use std::sync::Arc;

use rolewarden_core::AppResult;
use rolewarden_domain::{
    CommunityId, CommunitySnapshot, PlatformEvent, RoleId, RoleObservation, UserId,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    BootstrapSyncOrchestrator, ChunkListenerRegistry, FailurePolicy, FailureSource,
    GrantRepository, ProtectionReconciler, RoleRepository,
};

/// Dispatches platform feed events to store updates and reconciliation.
pub struct EventRouter {
    role_repository: Arc<dyn RoleRepository>,
    grant_repository: Arc<dyn GrantRepository>,
    reconciler: ProtectionReconciler,
    bootstrap: BootstrapSyncOrchestrator,
    chunk_listeners: Arc<ChunkListenerRegistry>,
    failure_policy: FailurePolicy,
}

impl EventRouter {
    /// Creates a router.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        grant_repository: Arc<dyn GrantRepository>,
        reconciler: ProtectionReconciler,
        bootstrap: BootstrapSyncOrchestrator,
        failure_policy: FailurePolicy,
    ) -> Self {
        let chunk_listeners = reconciler.chunk_listeners();

        Self {
            role_repository,
            grant_repository,
            reconciler,
            bootstrap,
            chunk_listeners,
            failure_policy,
        }
    }

    /// Consumes the feed until every sender is dropped.
    ///
    /// Member chunks are signaled inline; every other event runs on its own
    /// task so a long bootstrap never holds up incremental events.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<PlatformEvent>) {
        while let Some(event) = events.recv().await {
            if let PlatformEvent::MembersChunk(chunk) = &event {
                let signaled = self.chunk_listeners.observe_chunk(chunk);
                debug!(
                    community_id = %chunk.community_id,
                    chunk_index = chunk.chunk_index,
                    chunk_count = chunk.chunk_count,
                    signaled,
                    "observed member chunk"
                );
                continue;
            }

            let router = Arc::clone(&self);
            tokio::spawn(async move {
                router.dispatch(event).await;
            });
        }

        info!("platform event feed closed");
    }

    /// Handles one event to completion against current store state.
    pub async fn dispatch(&self, event: PlatformEvent) {
        debug!(
            event = event.as_str(),
            community_id = ?event.community_id(),
            "dispatching platform event"
        );

        match event {
            PlatformEvent::SessionReady { communities } => {
                self.bootstrap.run(&communities).await;
            }
            PlatformEvent::CommunityJoined { community } => {
                self.handle_community_joined(&community).await;
            }
            PlatformEvent::CommunityLeft {
                community_id,
                member_ids,
            } => {
                self.handle_community_left(&community_id, &member_ids).await;
            }
            PlatformEvent::MemberLeft {
                community_id,
                user_id,
            } => {
                let result = self
                    .grant_repository
                    .delete_member_grants(&user_id, &community_id)
                    .await
                    .map(|_| ());
                self.report_store_result("delete_member_grants", &community_id, result);
            }
            PlatformEvent::RoleCreated { community_id, role } => {
                let result = self.role_repository.upsert_role(&community_id, &role).await;
                self.report_store_result("upsert_role", &community_id, result);
            }
            PlatformEvent::RoleUpdated { community_id, role } => {
                self.handle_role_updated(&community_id, &role).await;
            }
            PlatformEvent::RoleDeleted {
                community_id,
                role_id,
            } => {
                self.handle_role_deleted(&community_id, &role_id).await;
            }
            PlatformEvent::MemberUpdated {
                community_id,
                user_id,
                role_ids,
            } => {
                self.reconciler
                    .reconcile_member(&user_id, &community_id, &role_ids)
                    .await;
            }
            PlatformEvent::MembersChunk(chunk) => {
                self.chunk_listeners.observe_chunk(&chunk);
            }
        }
    }

    async fn handle_community_joined(&self, community: &CommunitySnapshot) {
        let failures = self.bootstrap.seed_roles(community).await;
        info!(
            community_id = %community.community_id,
            roles = community.roles.len(),
            failures,
            "seeded roles for joined community"
        );
    }

    async fn handle_community_left(&self, community_id: &CommunityId, member_ids: &[UserId]) {
        let grants = match self
            .grant_repository
            .delete_community_grants(community_id)
            .await
        {
            Ok(count) => count,
            Err(error) => {
                self.failure_policy.report(
                    "delete_community_grants",
                    FailureSource::Store,
                    Some(community_id),
                    &error,
                );
                0
            }
        };

        let roles = match self.role_repository.list_roles(community_id).await {
            Ok(roles) => roles,
            Err(error) => {
                self.failure_policy.report(
                    "list_roles",
                    FailureSource::Store,
                    Some(community_id),
                    &error,
                );
                return;
            }
        };

        for role in &roles {
            let result = self.role_repository.delete_role(role.role_id()).await;
            self.report_store_result("delete_role", community_id, result);
        }

        info!(
            community_id = %community_id,
            members = member_ids.len(),
            grants,
            roles = roles.len(),
            "removed records of departed community"
        );
    }

    async fn handle_role_updated(&self, community_id: &CommunityId, role: &RoleObservation) {
        let result = self.role_repository.refresh_role(community_id, role).await;
        self.report_store_result("refresh_role", community_id, result);
    }

    async fn handle_role_deleted(&self, community_id: &CommunityId, role_id: &RoleId) {
        let result = self.role_repository.delete_role(role_id).await;
        self.report_store_result("delete_role", community_id, result);
    }

    fn report_store_result(
        &self,
        operation: &'static str,
        community_id: &CommunityId,
        result: AppResult<()>,
    ) {
        if let Err(error) = result {
            self.failure_policy.report(
                operation,
                FailureSource::Store,
                Some(community_id),
                &error,
            );
        }
    }
}

#[cfg(test)]
mod tests;
