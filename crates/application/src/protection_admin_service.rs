use std::sync::Arc;

use rolewarden_core::{AppError, AppResult};
use rolewarden_domain::{AuthorizationGrant, CommunityId, ProtectedRole, RoleId};
use tracing::info;

use crate::{
    FailurePolicy, FailureSource, GrantRecord, GrantRepository, PlatformSession,
    RevocationLedger, RoleRepository,
};

/// Result of an authorization change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationChange {
    /// Affected grant.
    pub grant: AuthorizationGrant,
    /// Whether the matching platform call succeeded.
    pub platform_synced: bool,
}

/// Administrative operations over protected roles and grants.
#[derive(Clone)]
pub struct ProtectionAdminService {
    role_repository: Arc<dyn RoleRepository>,
    grant_repository: Arc<dyn GrantRepository>,
    session: Arc<dyn PlatformSession>,
    ledger: Arc<RevocationLedger>,
    failure_policy: FailurePolicy,
}

impl ProtectionAdminService {
    /// Creates the admin service.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        grant_repository: Arc<dyn GrantRepository>,
        session: Arc<dyn PlatformSession>,
        ledger: Arc<RevocationLedger>,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            role_repository,
            grant_repository,
            session,
            ledger,
            failure_policy,
        }
    }

    /// Lists role records of a community.
    pub async fn list_roles(&self, community_id: &CommunityId) -> AppResult<Vec<ProtectedRole>> {
        self.role_repository.list_roles(community_id).await
    }

    /// Lists grants of a community.
    pub async fn list_grants(&self, community_id: &CommunityId) -> AppResult<Vec<GrantRecord>> {
        self.grant_repository.list_grants(community_id).await
    }

    /// Flips a role's protection flag.
    pub async fn toggle_protection(&self, role_id: &RoleId) -> AppResult<ProtectedRole> {
        let role = self.role_repository.toggle_protected(role_id).await?;
        info!(
            role_id = %role_id,
            community_id = %role.community_id(),
            is_protected = role.is_protected(),
            "toggled role protection"
        );

        Ok(role)
    }

    /// Authorizes a user for a protected role and grants it on the platform.
    pub async fn add_authorization(
        &self,
        grant: AuthorizationGrant,
    ) -> AppResult<AuthorizationChange> {
        let role = self
            .role_repository
            .find_role(grant.role_id())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("role '{}' was not found", grant.role_id()))
            })?;

        if role.community_id() != grant.community_id() {
            return Err(AppError::Conflict(format!(
                "role '{}' belongs to community '{}', not '{}'",
                grant.role_id(),
                role.community_id(),
                grant.community_id()
            )));
        }

        if !role.is_protected() {
            return Err(AppError::Conflict(format!(
                "role '{}' is not protected",
                grant.role_id()
            )));
        }

        self.grant_repository.upsert_grant(&grant).await?;
        self.ledger
            .clear(grant.community_id(), grant.user_id(), grant.role_id());

        let platform_synced = self
            .sync_platform(
                "grant_role",
                grant.community_id(),
                self.session
                    .grant_role(grant.community_id(), grant.user_id(), grant.role_id())
                    .await,
            );

        info!(
            user_id = %grant.user_id(),
            community_id = %grant.community_id(),
            role_id = %grant.role_id(),
            platform_synced,
            "authorization added"
        );

        Ok(AuthorizationChange {
            grant,
            platform_synced,
        })
    }

    /// Removes an authorization and revokes the role on the platform.
    pub async fn remove_authorization(
        &self,
        grant: AuthorizationGrant,
    ) -> AppResult<AuthorizationChange> {
        let existed = self
            .grant_repository
            .delete_grant(grant.user_id(), grant.community_id(), grant.role_id())
            .await?;

        let platform_synced = self
            .sync_platform(
                "revoke_role",
                grant.community_id(),
                self.session
                    .revoke_role(grant.community_id(), grant.user_id(), grant.role_id())
                    .await,
            );

        info!(
            user_id = %grant.user_id(),
            community_id = %grant.community_id(),
            role_id = %grant.role_id(),
            existed,
            platform_synced,
            "authorization removed"
        );

        Ok(AuthorizationChange {
            grant,
            platform_synced,
        })
    }

    fn sync_platform(
        &self,
        operation: &'static str,
        community_id: &CommunityId,
        result: AppResult<()>,
    ) -> bool {
        match result {
            Ok(()) => true,
            Err(error) => {
                self.failure_policy.report(
                    operation,
                    FailureSource::Platform,
                    Some(community_id),
                    &error,
                );
                false
            }
        }
    }
}
