use serde::{Deserialize, Serialize};

use crate::{CommunityId, CommunitySnapshot, MembersChunk, RoleId, RoleObservation, UserId};

/// Dispatch event delivered by the chat platform feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// Session established; carries every community the session belongs to.
    SessionReady {
        /// Communities visible to the session.
        communities: Vec<CommunitySnapshot>,
    },
    /// The session joined or became able to see a community.
    CommunityJoined {
        /// Current community state.
        community: CommunitySnapshot,
    },
    /// The session left a community or the community was removed.
    CommunityLeft {
        /// Community identifier.
        community_id: CommunityId,
        /// Members last known to belong to the community.
        #[serde(default)]
        member_ids: Vec<UserId>,
    },
    /// A member left the community.
    MemberLeft {
        /// Community identifier.
        community_id: CommunityId,
        /// Departed user.
        user_id: UserId,
    },
    /// A role was created.
    RoleCreated {
        /// Community identifier.
        community_id: CommunityId,
        /// New role.
        role: RoleObservation,
    },
    /// A role's display attributes changed.
    RoleUpdated {
        /// Community identifier.
        community_id: CommunityId,
        /// Updated role.
        role: RoleObservation,
    },
    /// A role was deleted.
    RoleDeleted {
        /// Community identifier.
        community_id: CommunityId,
        /// Deleted role.
        role_id: RoleId,
    },
    /// A member's roles changed; carries the full current role list.
    MemberUpdated {
        /// Community identifier.
        community_id: CommunityId,
        /// Updated member.
        user_id: UserId,
        /// Every role the member now holds.
        #[serde(default)]
        role_ids: Vec<RoleId>,
    },
    /// One page of a requested membership listing.
    MembersChunk(MembersChunk),
}

impl PlatformEvent {
    /// Returns a stable name for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionReady { .. } => "session_ready",
            Self::CommunityJoined { .. } => "community_joined",
            Self::CommunityLeft { .. } => "community_left",
            Self::MemberLeft { .. } => "member_left",
            Self::RoleCreated { .. } => "role_created",
            Self::RoleUpdated { .. } => "role_updated",
            Self::RoleDeleted { .. } => "role_deleted",
            Self::MemberUpdated { .. } => "member_updated",
            Self::MembersChunk(_) => "members_chunk",
        }
    }

    /// Returns the community the event is scoped to, if any.
    #[must_use]
    pub fn community_id(&self) -> Option<&CommunityId> {
        match self {
            Self::SessionReady { .. } => None,
            Self::CommunityJoined { community } => Some(&community.community_id),
            Self::CommunityLeft { community_id, .. }
            | Self::MemberLeft { community_id, .. }
            | Self::RoleCreated { community_id, .. }
            | Self::RoleUpdated { community_id, .. }
            | Self::RoleDeleted { community_id, .. }
            | Self::MemberUpdated { community_id, .. } => Some(community_id),
            Self::MembersChunk(chunk) => Some(&chunk.community_id),
        }
    }
}
