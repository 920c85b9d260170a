use std::collections::{BTreeMap, HashMap};

use rolewarden_domain::{
    CommunityId, CommunitySnapshot, MemberSnapshot, PlatformEvent, RoleId, UserId,
};

#[derive(Debug, Default)]
struct CommunityCache {
    members: BTreeMap<UserId, Vec<RoleId>>,
}

impl CommunityCache {
    fn from_snapshot(snapshot: &CommunitySnapshot) -> Self {
        let mut cache = Self::default();
        cache.merge_members(&snapshot.members);
        cache
    }

    fn merge_members(&mut self, members: &[MemberSnapshot]) {
        for member in members {
            self.members
                .insert(member.user_id.clone(), member.role_ids.clone());
        }
    }
}

/// Membership rosters mirrored from the gateway feed.
#[derive(Debug, Default)]
pub(super) struct SessionCache {
    communities: HashMap<CommunityId, CommunityCache>,
}

impl SessionCache {
    pub(super) fn apply(&mut self, event: &PlatformEvent) {
        match event {
            PlatformEvent::SessionReady { communities } => {
                self.communities.clear();
                for snapshot in communities {
                    self.replace(snapshot);
                }
            }
            PlatformEvent::CommunityJoined { community } => self.replace(community),
            PlatformEvent::CommunityLeft { community_id, .. } => {
                self.communities.remove(community_id);
            }
            PlatformEvent::MemberLeft {
                community_id,
                user_id,
            } => {
                if let Some(community) = self.communities.get_mut(community_id) {
                    community.members.remove(user_id);
                }
            }
            PlatformEvent::RoleCreated { .. } | PlatformEvent::RoleUpdated { .. } => {}
            PlatformEvent::RoleDeleted {
                community_id,
                role_id,
            } => {
                if let Some(community) = self.communities.get_mut(community_id) {
                    for held in community.members.values_mut() {
                        held.retain(|candidate| candidate != role_id);
                    }
                }
            }
            PlatformEvent::MemberUpdated {
                community_id,
                user_id,
                role_ids,
            } => {
                self.community_mut(community_id)
                    .members
                    .insert(user_id.clone(), role_ids.clone());
            }
            PlatformEvent::MembersChunk(chunk) => {
                self.community_mut(&chunk.community_id)
                    .merge_members(&chunk.members);
            }
        }
    }

    pub(super) fn members(&self, community_id: &CommunityId) -> Vec<MemberSnapshot> {
        self.communities
            .get(community_id)
            .map(|community| {
                community
                    .members
                    .iter()
                    .map(|(user_id, role_ids)| MemberSnapshot::new(user_id.clone(), role_ids.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(super) fn clear(&mut self) {
        self.communities.clear();
    }

    fn replace(&mut self, snapshot: &CommunitySnapshot) {
        self.communities.insert(
            snapshot.community_id.clone(),
            CommunityCache::from_snapshot(snapshot),
        );
    }

    fn community_mut(&mut self, community_id: &CommunityId) -> &mut CommunityCache {
        self.communities.entry(community_id.clone()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use rolewarden_domain::{
        CommunityId, CommunitySnapshot, MemberSnapshot, MembersChunk, PlatformEvent, RoleId,
        RoleObservation, UserId,
    };

    use super::SessionCache;

    fn community(value: &str) -> CommunityId {
        CommunityId::new(value).unwrap_or_else(|error| panic!("invalid community id: {error}"))
    }

    fn role(value: &str) -> RoleId {
        RoleId::new(value).unwrap_or_else(|error| panic!("invalid role id: {error}"))
    }

    fn user(value: &str) -> UserId {
        UserId::new(value).unwrap_or_else(|error| panic!("invalid user id: {error}"))
    }

    fn joined(community_id: &str) -> PlatformEvent {
        PlatformEvent::CommunityJoined {
            community: CommunitySnapshot {
                community_id: community(community_id),
                name: None,
                roles: vec![
                    RoleObservation::new(role("mod"), "Moderator", 0),
                    RoleObservation::new(role("vip"), "VIP", 0),
                ],
                members: vec![MemberSnapshot::new(user("alice"), vec![role("mod")])],
            },
        }
    }

    #[test]
    fn chunks_merge_into_inline_members() {
        let mut cache = SessionCache::default();
        cache.apply(&joined("guild1"));
        cache.apply(&PlatformEvent::MembersChunk(MembersChunk {
            community_id: community("guild1"),
            chunk_index: 0,
            chunk_count: 1,
            members: vec![
                MemberSnapshot::new(user("bob"), vec![role("vip")]),
                MemberSnapshot::new(user("alice"), vec![role("mod"), role("vip")]),
            ],
            nonce: None,
        }));

        let members = cache.members(&community("guild1"));
        assert_eq!(members.len(), 2);
        assert!(members[0].role_ids.contains(&role("vip")));
        assert_eq!(members[0].user_id, user("alice"));
    }

    #[test]
    fn role_deletion_strips_role_from_members() {
        let mut cache = SessionCache::default();
        cache.apply(&joined("guild1"));
        cache.apply(&PlatformEvent::RoleDeleted {
            community_id: community("guild1"),
            role_id: role("mod"),
        });

        let members = cache.members(&community("guild1"));
        assert_eq!(members.len(), 1);
        assert!(
            members
                .iter()
                .all(|member| !member.role_ids.contains(&role("mod")))
        );
    }

    #[test]
    fn member_and_community_departures_drop_state() {
        let mut cache = SessionCache::default();
        cache.apply(&joined("guild1"));
        cache.apply(&joined("guild2"));
        cache.apply(&PlatformEvent::MemberLeft {
            community_id: community("guild1"),
            user_id: user("alice"),
        });
        cache.apply(&PlatformEvent::CommunityLeft {
            community_id: community("guild2"),
            member_ids: Vec::new(),
        });

        assert!(cache.members(&community("guild1")).is_empty());
        assert!(cache.members(&community("guild2")).is_empty());
        cache.apply(&PlatformEvent::MemberUpdated {
            community_id: community("guild1"),
            user_id: user("bob"),
            role_ids: vec![role("vip")],
        });
        assert_eq!(cache.members(&community("guild1")).len(), 1);
    }

    #[test]
    fn session_ready_replaces_previous_state() {
        let mut cache = SessionCache::default();
        cache.apply(&joined("guild1"));
        cache.apply(&PlatformEvent::SessionReady {
            communities: vec![CommunitySnapshot {
                community_id: community("guild2"),
                name: None,
                roles: Vec::new(),
                members: Vec::new(),
            }],
        });

        assert!(cache.members(&community("guild1")).is_empty());
    }
}
