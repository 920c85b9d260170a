use async_trait::async_trait;

use rolewarden_core::AppResult;
use rolewarden_domain::{CommunityId, MemberSnapshot, RoleId, UserId};

/// Identity of the connected bot account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Bot user identifier.
    pub user_id: UserId,
    /// Bot display name.
    pub username: String,
}

/// Port for the live chat platform session.
///
/// Adapters apply every feed event to their cache before handing it to the
/// router, so cached state is never older than the event being handled.
#[async_trait]
pub trait PlatformSession: Send + Sync {
    /// Verifies credentials and returns the bot identity.
    async fn connect(&self) -> AppResult<SessionIdentity>;

    /// Releases the session.
    async fn disconnect(&self) -> AppResult<()>;

    /// Requests a full membership listing delivered as member chunks.
    async fn request_membership_chunks(
        &self,
        community_id: &CommunityId,
        nonce: &str,
    ) -> AppResult<()>;

    /// Removes a role from a member.
    async fn revoke_role(
        &self,
        community_id: &CommunityId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()>;

    /// Adds a role to a member.
    async fn grant_role(
        &self,
        community_id: &CommunityId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()>;

    /// Returns the cached membership roster of a community.
    async fn cached_members(&self, community_id: &CommunityId) -> AppResult<Vec<MemberSnapshot>>;
}
