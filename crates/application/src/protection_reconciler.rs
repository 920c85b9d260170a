use std::sync::Arc;

use rolewarden_core::AppResult;
use rolewarden_domain::{CommunityId, RoleId, UserId};
use tracing::{debug, info};

use crate::{
    ChunkListenerRegistry, FailurePolicy, FailureSource, GrantRepository,
    MembershipSnapshotCollector, PlatformSession, RevocationLedger, RoleRepository,
};

/// Outcome of reconciling one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberReconciliation {
    /// Protected roles the member holds with a grant.
    pub authorized: usize,
    /// Roles revoked on the platform during this call.
    pub revoked: Vec<RoleId>,
    /// Roles skipped because a revoke is already in flight.
    pub deduplicated: usize,
    /// Lookups or revoke calls that failed.
    pub failures: usize,
}

/// Outcome of reconciling a whole community roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityReconciliation {
    /// Reconciled community.
    pub community_id: CommunityId,
    /// Members in the collected roster.
    pub members: usize,
    /// Revoke calls issued.
    pub revocations: usize,
    /// Failures across all members.
    pub failures: usize,
}

enum RoleVerdict {
    Unenforced,
    Authorized,
    Revoked,
    AlreadyRevoking,
    Failed,
}

/// Enforces protection: protected roles stay only with a recorded grant.
#[derive(Clone)]
pub struct ProtectionReconciler {
    role_repository: Arc<dyn RoleRepository>,
    grant_repository: Arc<dyn GrantRepository>,
    session: Arc<dyn PlatformSession>,
    collector: MembershipSnapshotCollector,
    ledger: Arc<RevocationLedger>,
    failure_policy: FailurePolicy,
}

impl ProtectionReconciler {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        grant_repository: Arc<dyn GrantRepository>,
        session: Arc<dyn PlatformSession>,
        collector: MembershipSnapshotCollector,
        ledger: Arc<RevocationLedger>,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            role_repository,
            grant_repository,
            session,
            collector,
            ledger,
            failure_policy,
        }
    }

    /// Returns the registry that completes this reconciler's snapshot waits.
    #[must_use]
    pub fn chunk_listeners(&self) -> Arc<ChunkListenerRegistry> {
        self.collector.listeners()
    }

    /// Revokes every protected role the member holds without a grant.
    ///
    /// Never fails: lookup and revoke errors are reported as recoverable and
    /// the remaining roles are still checked.
    pub async fn reconcile_member(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        held_role_ids: &[RoleId],
    ) -> MemberReconciliation {
        self.ledger.retain_held(community_id, user_id, held_role_ids);

        let mut report = MemberReconciliation::default();
        for role_id in held_role_ids {
            match self.enforce_role(user_id, community_id, role_id).await {
                RoleVerdict::Unenforced => {}
                RoleVerdict::Authorized => report.authorized += 1,
                RoleVerdict::Revoked => report.revoked.push(role_id.clone()),
                RoleVerdict::AlreadyRevoking => report.deduplicated += 1,
                RoleVerdict::Failed => report.failures += 1,
            }
        }

        report
    }

    /// Collects the full roster of a community and reconciles every member.
    ///
    /// Fails only when the roster cannot be collected.
    pub async fn reconcile_community(
        &self,
        community_id: &CommunityId,
    ) -> AppResult<CommunityReconciliation> {
        let members = self.collector.collect(community_id).await?;

        let mut report = CommunityReconciliation {
            community_id: community_id.clone(),
            members: members.len(),
            revocations: 0,
            failures: 0,
        };

        for member in &members {
            let outcome = self
                .reconcile_member(&member.user_id, community_id, &member.role_ids)
                .await;
            report.revocations += outcome.revoked.len();
            report.failures += outcome.failures;
        }

        info!(
            community_id = %community_id,
            members = report.members,
            revocations = report.revocations,
            failures = report.failures,
            "community reconciled"
        );

        Ok(report)
    }

    async fn enforce_role(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        role_id: &RoleId,
    ) -> RoleVerdict {
        let role = match self.role_repository.find_role(role_id).await {
            Ok(Some(role)) => role,
            Ok(None) => return RoleVerdict::Unenforced,
            Err(error) => {
                self.failure_policy.report(
                    "find_role",
                    FailureSource::Store,
                    Some(community_id),
                    &error,
                );
                return RoleVerdict::Failed;
            }
        };

        if !role.is_enforced_in(community_id) {
            return RoleVerdict::Unenforced;
        }

        match self
            .grant_repository
            .find_grant(user_id, community_id, role_id)
            .await
        {
            Ok(Some(_)) => return RoleVerdict::Authorized,
            Ok(None) => {}
            Err(error) => {
                self.failure_policy.report(
                    "find_grant",
                    FailureSource::Store,
                    Some(community_id),
                    &error,
                );
                return RoleVerdict::Failed;
            }
        }

        if self.ledger.is_pending(community_id, user_id, role_id) {
            debug!(
                community_id = %community_id,
                user_id = %user_id,
                role_id = %role_id,
                "revoke already issued, skipping"
            );
            return RoleVerdict::AlreadyRevoking;
        }

        match self
            .session
            .revoke_role(community_id, user_id, role_id)
            .await
        {
            Ok(()) => {
                self.ledger.record(community_id, user_id, role_id);
                info!(
                    community_id = %community_id,
                    user_id = %user_id,
                    role_id = %role_id,
                    "revoked unauthorized protected role"
                );
                RoleVerdict::Revoked
            }
            Err(error) => {
                self.failure_policy.report(
                    "revoke_role",
                    FailureSource::Platform,
                    Some(community_id),
                    &error,
                );
                RoleVerdict::Failed
            }
        }
    }
}
