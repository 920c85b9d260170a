use serde::{Deserialize, Serialize};

use crate::{CommunityId, RoleId};

/// Role as currently observed on the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleObservation {
    /// Platform role identifier.
    pub role_id: RoleId,
    /// Display name.
    pub name: String,
    /// Display color as an RGB integer.
    #[serde(default)]
    pub color: i32,
}

impl RoleObservation {
    /// Creates a role observation.
    #[must_use]
    pub fn new(role_id: RoleId, name: impl Into<String>, color: i32) -> Self {
        Self {
            role_id,
            name: name.into(),
            color,
        }
    }
}

/// Persisted role record carrying the protection flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedRole {
    role_id: RoleId,
    community_id: CommunityId,
    name: String,
    color: i32,
    is_protected: bool,
}

impl ProtectedRole {
    /// Creates a role record.
    #[must_use]
    pub fn new(
        role_id: RoleId,
        community_id: CommunityId,
        name: impl Into<String>,
        color: i32,
        is_protected: bool,
    ) -> Self {
        Self {
            role_id,
            community_id,
            name: name.into(),
            color,
            is_protected,
        }
    }

    /// Creates the unprotected record stored when a role is first observed.
    #[must_use]
    pub fn observed(community_id: CommunityId, observation: &RoleObservation) -> Self {
        Self::new(
            observation.role_id.clone(),
            community_id,
            observation.name.clone(),
            observation.color,
            false,
        )
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }

    /// Returns the owning community.
    #[must_use]
    pub fn community_id(&self) -> &CommunityId {
        &self.community_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the display color.
    #[must_use]
    pub fn color(&self) -> i32 {
        self.color
    }

    /// Returns whether holders must be explicitly authorized.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.is_protected
    }

    /// Returns whether protection applies to holders in the given community.
    #[must_use]
    pub fn is_enforced_in(&self, community_id: &CommunityId) -> bool {
        self.is_protected && &self.community_id == community_id
    }

    /// Returns a copy with the protection flag flipped.
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            is_protected: !self.is_protected,
            ..self.clone()
        }
    }

    /// Returns a copy carrying the observed display attributes.
    #[must_use]
    pub fn refreshed(&self, observation: &RoleObservation) -> Self {
        Self {
            name: observation.name.clone(),
            color: observation.color,
            ..self.clone()
        }
    }
}
