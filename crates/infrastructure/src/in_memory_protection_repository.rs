use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rolewarden_application::{GrantRecord, GrantRepository, RoleRepository};
use rolewarden_core::{AppError, AppResult};
use rolewarden_domain::{
    AuthorizationGrant, CommunityId, ProtectedRole, RoleId, RoleObservation, UserId,
};
use tokio::sync::RwLock;

type GrantKey = (UserId, CommunityId, RoleId);

/// In-memory role and grant store.
#[derive(Debug, Default)]
pub struct InMemoryProtectionRepository {
    roles: RwLock<HashMap<RoleId, ProtectedRole>>,
    grants: RwLock<HashMap<GrantKey, DateTime<Utc>>>,
}

impl InMemoryProtectionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn grant_key(user_id: &UserId, community_id: &CommunityId, role_id: &RoleId) -> GrantKey {
    (user_id.clone(), community_id.clone(), role_id.clone())
}

#[async_trait]
impl RoleRepository for InMemoryProtectionRepository {
    async fn upsert_role(
        &self,
        community_id: &CommunityId,
        role: &RoleObservation,
    ) -> AppResult<()> {
        self.roles
            .write()
            .await
            .entry(role.role_id.clone())
            .or_insert_with(|| ProtectedRole::observed(community_id.clone(), role));
        Ok(())
    }

    async fn refresh_role(
        &self,
        community_id: &CommunityId,
        role: &RoleObservation,
    ) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        let refreshed = match roles.get(&role.role_id) {
            Some(existing) => existing.refreshed(role),
            None => ProtectedRole::observed(community_id.clone(), role),
        };
        roles.insert(role.role_id.clone(), refreshed);
        Ok(())
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        self.roles.write().await.remove(role_id);
        Ok(())
    }

    async fn list_roles(&self, community_id: &CommunityId) -> AppResult<Vec<ProtectedRole>> {
        let roles = self.roles.read().await;

        let mut values: Vec<ProtectedRole> = roles
            .values()
            .filter(|role| role.community_id() == community_id)
            .cloned()
            .collect();
        values.sort_by(|left, right| {
            left.name()
                .cmp(right.name())
                .then_with(|| left.role_id().cmp(right.role_id()))
        });

        Ok(values)
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<ProtectedRole>> {
        Ok(self.roles.read().await.get(role_id).cloned())
    }

    async fn toggle_protected(&self, role_id: &RoleId) -> AppResult<ProtectedRole> {
        let mut roles = self.roles.write().await;
        let role = roles
            .get_mut(role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        *role = role.toggled();
        Ok(role.clone())
    }
}

#[async_trait]
impl GrantRepository for InMemoryProtectionRepository {
    async fn upsert_grant(&self, grant: &AuthorizationGrant) -> AppResult<()> {
        self.grants
            .write()
            .await
            .entry(grant_key(
                grant.user_id(),
                grant.community_id(),
                grant.role_id(),
            ))
            .or_insert_with(Utc::now);
        Ok(())
    }

    async fn find_grant(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        role_id: &RoleId,
    ) -> AppResult<Option<AuthorizationGrant>> {
        let grants = self.grants.read().await;

        Ok(grants
            .contains_key(&grant_key(user_id, community_id, role_id))
            .then(|| {
                AuthorizationGrant::new(user_id.clone(), community_id.clone(), role_id.clone())
            }))
    }

    async fn delete_grant(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        role_id: &RoleId,
    ) -> AppResult<bool> {
        Ok(self
            .grants
            .write()
            .await
            .remove(&grant_key(user_id, community_id, role_id))
            .is_some())
    }

    async fn delete_member_grants(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> AppResult<u64> {
        let mut grants = self.grants.write().await;
        let before = grants.len();
        grants.retain(|(stored_user, stored_community, _), _| {
            stored_user != user_id || stored_community != community_id
        });

        Ok(u64::try_from(before - grants.len()).unwrap_or(u64::MAX))
    }

    async fn delete_community_grants(&self, community_id: &CommunityId) -> AppResult<u64> {
        let mut grants = self.grants.write().await;
        let before = grants.len();
        grants.retain(|(_, stored_community, _), _| stored_community != community_id);

        Ok(u64::try_from(before - grants.len()).unwrap_or(u64::MAX))
    }

    async fn list_grants(&self, community_id: &CommunityId) -> AppResult<Vec<GrantRecord>> {
        let grants = self.grants.read().await;

        let mut entries: Vec<(&GrantKey, &DateTime<Utc>)> = grants
            .iter()
            .filter(|((_, stored_community, _), _)| stored_community == community_id)
            .collect();
        entries.sort_by(|left, right| left.1.cmp(right.1).then_with(|| left.0.cmp(right.0)));

        Ok(entries
            .into_iter()
            .map(|((user_id, community_id, role_id), granted_at)| GrantRecord {
                grant: AuthorizationGrant::new(
                    user_id.clone(),
                    community_id.clone(),
                    role_id.clone(),
                ),
                granted_at: granted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            })
            .collect())
    }
}
