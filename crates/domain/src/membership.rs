use serde::{Deserialize, Serialize};

use crate::{CommunityId, RoleId, RoleObservation, UserId};

/// One member and the full list of roles they currently hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    /// Member user identifier.
    pub user_id: UserId,
    /// Every role the member holds.
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

impl MemberSnapshot {
    /// Creates a member snapshot.
    #[must_use]
    pub fn new(user_id: UserId, role_ids: Vec<RoleId>) -> Self {
        Self { user_id, role_ids }
    }
}

/// Community state as delivered when the session sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunitySnapshot {
    /// Community identifier.
    pub community_id: CommunityId,
    /// Display name, when the platform sent one.
    #[serde(default)]
    pub name: Option<String>,
    /// Every role currently defined in the community.
    #[serde(default)]
    pub roles: Vec<RoleObservation>,
    /// Members delivered inline; usually partial for large communities.
    #[serde(default)]
    pub members: Vec<MemberSnapshot>,
}

/// One page of a paginated membership listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersChunk {
    /// Community the listing belongs to.
    pub community_id: CommunityId,
    /// Zero-based index of this chunk.
    pub chunk_index: u32,
    /// Total number of chunks in the listing.
    pub chunk_count: u32,
    /// Members delivered in this chunk.
    #[serde(default)]
    pub members: Vec<MemberSnapshot>,
    /// Request nonce echoed back by the platform.
    #[serde(default)]
    pub nonce: Option<String>,
}

impl MembersChunk {
    /// Returns whether this chunk ends the listing.
    ///
    /// A zero chunk count marks an empty listing and also ends it.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.chunk_count == 0 || self.chunk_index.checked_add(1) == Some(self.chunk_count)
    }

    /// Returns whether this chunk answers the request with the given nonce.
    ///
    /// Chunks without a nonce are attributed to any request for the community.
    #[must_use]
    pub fn answers(&self, community_id: &CommunityId, nonce: &str) -> bool {
        &self.community_id == community_id
            && self
                .nonce
                .as_deref()
                .is_none_or(|chunk_nonce| chunk_nonce == nonce)
    }
}
