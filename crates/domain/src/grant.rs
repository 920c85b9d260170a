use serde::{Deserialize, Serialize};

use crate::{CommunityId, RoleId, UserId};

/// Explicit permission for one user to hold one protected role in one community.
///
/// Grants are write-once: they are created and deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorizationGrant {
    user_id: UserId,
    community_id: CommunityId,
    role_id: RoleId,
}

impl AuthorizationGrant {
    /// Creates a grant for the given triple.
    #[must_use]
    pub fn new(user_id: UserId, community_id: CommunityId, role_id: RoleId) -> Self {
        Self {
            user_id,
            community_id,
            role_id,
        }
    }

    /// Returns the authorized user.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the community the grant is scoped to.
    #[must_use]
    pub fn community_id(&self) -> &CommunityId {
        &self.community_id
    }

    /// Returns the authorized role.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }
}
