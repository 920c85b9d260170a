use async_trait::async_trait;

use rolewarden_core::AppResult;
use rolewarden_domain::{
    AuthorizationGrant, CommunityId, ProtectedRole, RoleId, RoleObservation, UserId,
};

/// Grant projection for administrative listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRecord {
    /// Granted triple.
    pub grant: AuthorizationGrant,
    /// Grant timestamp in RFC3339.
    pub granted_at: String,
}

/// Repository port for persisted role records.
///
/// Every operation is a single atomic statement against the store.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Inserts an unprotected role record unless the role id already exists.
    async fn upsert_role(
        &self,
        community_id: &CommunityId,
        role: &RoleObservation,
    ) -> AppResult<()>;

    /// Refreshes display attributes, inserting an unprotected record when unknown.
    async fn refresh_role(
        &self,
        community_id: &CommunityId,
        role: &RoleObservation,
    ) -> AppResult<()>;

    /// Deletes a role record. Missing roles are not an error.
    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()>;

    /// Lists role records of one community.
    async fn list_roles(&self, community_id: &CommunityId) -> AppResult<Vec<ProtectedRole>>;

    /// Finds one role record by its platform-wide identifier.
    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<ProtectedRole>>;

    /// Flips the protection flag and returns the updated record.
    async fn toggle_protected(&self, role_id: &RoleId) -> AppResult<ProtectedRole>;
}

/// Repository port for authorization grants.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Records a grant unless the triple already exists.
    async fn upsert_grant(&self, grant: &AuthorizationGrant) -> AppResult<()>;

    /// Finds the grant for one triple.
    async fn find_grant(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        role_id: &RoleId,
    ) -> AppResult<Option<AuthorizationGrant>>;

    /// Deletes the grant for one triple and reports whether it existed.
    async fn delete_grant(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        role_id: &RoleId,
    ) -> AppResult<bool>;

    /// Deletes every grant of a user in a community and returns the count.
    async fn delete_member_grants(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> AppResult<u64>;

    /// Deletes every grant scoped to a community and returns the count.
    async fn delete_community_grants(&self, community_id: &CommunityId) -> AppResult<u64>;

    /// Lists grants of one community.
    async fn list_grants(&self, community_id: &CommunityId) -> AppResult<Vec<GrantRecord>>;
}
