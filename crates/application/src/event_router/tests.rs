use std::sync::Arc;
use std::time::Duration;

use rolewarden_domain::{
    AuthorizationGrant, CommunitySnapshot, MembersChunk, PlatformEvent, RoleObservation,
};
use tokio::sync::mpsc;

use crate::test_support::{EngineHarness, community, role, user};

fn observation(role_id: &str, name: &str) -> RoleObservation {
    RoleObservation::new(role(role_id), name, 0)
}

#[tokio::test]
async fn member_update_after_toggle_revokes_exactly_once() {
    let harness = EngineHarness::new();
    harness.seed_role("mod", "guild1", false).await;

    let toggled = harness.admin.toggle_protection(&role("mod")).await;
    assert!(toggled.is_ok_and(|role| role.is_protected()));

    harness
        .router
        .dispatch(PlatformEvent::MemberUpdated {
            community_id: community("guild1"),
            user_id: user("alice"),
            role_ids: vec![role("mod")],
        })
        .await;

    assert_eq!(
        harness.session.revocations().await,
        vec![(community("guild1"), user("alice"), role("mod"))]
    );
}

#[tokio::test]
async fn member_update_after_admin_grant_revokes_nothing() {
    let harness = EngineHarness::new();
    harness.seed_role("mod", "guild1", true).await;

    let added = harness
        .admin
        .add_authorization(AuthorizationGrant::new(
            user("alice"),
            community("guild1"),
            role("mod"),
        ))
        .await;
    assert!(added.is_ok());

    harness
        .router
        .dispatch(PlatformEvent::MemberUpdated {
            community_id: community("guild1"),
            user_id: user("alice"),
            role_ids: vec![role("mod")],
        })
        .await;

    assert!(harness.session.revocations().await.is_empty());
}

#[tokio::test]
async fn role_created_inserts_unprotected_and_ignores_existing() {
    let harness = EngineHarness::new();
    harness.seed_role("mod", "guild1", true).await;

    for role_id in ["mod", "helper"] {
        harness
            .router
            .dispatch(PlatformEvent::RoleCreated {
                community_id: community("guild1"),
                role: observation(role_id, role_id),
            })
            .await;
    }

    let roles = harness.roles.roles.lock().await;
    assert!(roles.get(&role("mod")).is_some_and(|role| role.is_protected()));
    assert!(
        roles
            .get(&role("helper"))
            .is_some_and(|role| !role.is_protected())
    );
}

#[tokio::test]
async fn role_updated_refreshes_name_without_touching_protection() {
    let harness = EngineHarness::new();
    harness.seed_role("mod", "guild1", true).await;

    harness
        .router
        .dispatch(PlatformEvent::RoleUpdated {
            community_id: community("guild1"),
            role: observation("mod", "Moderators"),
        })
        .await;

    let roles = harness.roles.roles.lock().await;
    let Some(updated) = roles.get(&role("mod")) else {
        panic!("role should still exist");
    };
    assert_eq!(updated.name(), "Moderators");
    assert!(updated.is_protected());
}

#[tokio::test]
async fn role_deleted_removes_record_but_leaves_grants() {
    let harness = EngineHarness::new();
    harness.seed_role("mod", "guild1", true).await;
    harness.grants.insert("alice", "guild1", "mod").await;

    harness
        .router
        .dispatch(PlatformEvent::RoleDeleted {
            community_id: community("guild1"),
            role_id: role("mod"),
        })
        .await;

    assert!(harness.roles.roles.lock().await.is_empty());
    assert_eq!(harness.grants.count().await, 1);
}

#[tokio::test]
async fn member_left_removes_all_member_grants_in_community() {
    let harness = EngineHarness::new();
    harness.grants.insert("alice", "guild1", "mod").await;
    harness.grants.insert("alice", "guild1", "admin").await;
    harness.grants.insert("alice", "guild2", "mod").await;

    harness
        .router
        .dispatch(PlatformEvent::MemberLeft {
            community_id: community("guild1"),
            user_id: user("alice"),
        })
        .await;

    assert_eq!(harness.grants.count().await, 1);
}

#[tokio::test]
async fn community_left_removes_grants_and_roles_of_that_community() {
    let harness = EngineHarness::new();
    harness.seed_role("mod", "guild1", true).await;
    harness.seed_role("admin", "guild1", true).await;
    harness.seed_role("vip", "guild2", true).await;
    harness.grants.insert("alice", "guild1", "mod").await;
    harness.grants.insert("bob", "guild1", "admin").await;
    harness.grants.insert("alice", "guild2", "vip").await;

    harness
        .router
        .dispatch(PlatformEvent::CommunityLeft {
            community_id: community("guild1"),
            member_ids: vec![user("alice")],
        })
        .await;

    let roles = harness.roles.roles.lock().await;
    assert_eq!(roles.len(), 1);
    assert!(roles.contains_key(&role("vip")));
    assert_eq!(harness.grants.count().await, 1);
}

#[tokio::test]
async fn community_left_without_member_list_still_removes_every_grant() {
    let harness = EngineHarness::new();
    harness.seed_role("mod", "guild1", true).await;
    harness.grants.insert("alice", "guild1", "mod").await;
    harness.grants.insert("bob", "guild1", "mod").await;

    harness
        .router
        .dispatch(PlatformEvent::CommunityLeft {
            community_id: community("guild1"),
            member_ids: Vec::new(),
        })
        .await;

    assert_eq!(harness.grants.count().await, 0);
    assert!(harness.roles.roles.lock().await.is_empty());
}

#[tokio::test]
async fn community_joined_seeds_roles() {
    let harness = EngineHarness::new();

    harness
        .router
        .dispatch(PlatformEvent::CommunityJoined {
            community: CommunitySnapshot {
                community_id: community("guild3"),
                name: Some("Guild Three".to_owned()),
                roles: vec![observation("a", "A"), observation("b", "B")],
                members: Vec::new(),
            },
        })
        .await;

    assert_eq!(harness.roles.roles.lock().await.len(), 2);
    assert!(harness.session.chunk_requests.lock().await.is_empty());
}

#[tokio::test]
async fn run_loop_completes_bootstrap_from_feed_chunks() {
    let harness = EngineHarness::with_chunk_timeout(Duration::from_secs(30));
    harness.seed_role("mod", "guild1", true).await;
    harness
        .session
        .set_members("guild1", vec![("alice", vec!["mod"])])
        .await;
    harness
        .session
        .chunk_plans
        .lock()
        .await
        .insert(community("guild1"), Vec::new());

    let (sender, receiver) = mpsc::channel(16);
    let loop_handle = tokio::spawn(Arc::clone(&harness.router).run(receiver));

    let ready = sender
        .send(PlatformEvent::SessionReady {
            communities: vec![CommunitySnapshot {
                community_id: community("guild1"),
                name: None,
                roles: vec![observation("mod", "Moderator")],
                members: Vec::new(),
            }],
        })
        .await;
    assert!(ready.is_ok());

    while harness.listeners.listener_count() == 0 {
        tokio::task::yield_now().await;
    }

    let chunk = sender
        .send(PlatformEvent::MembersChunk(MembersChunk {
            community_id: community("guild1"),
            chunk_index: 0,
            chunk_count: 1,
            members: Vec::new(),
            nonce: None,
        }))
        .await;
    assert!(chunk.is_ok());

    while harness.session.revocations().await.is_empty() {
        tokio::task::yield_now().await;
    }

    drop(sender);
    assert!(loop_handle.await.is_ok());
    assert_eq!(harness.session.revocations_of("mod").await, 1);
}

#[tokio::test]
async fn member_update_is_reconciled_while_bootstrap_waits_for_chunks() {
    let harness = EngineHarness::with_chunk_timeout(Duration::from_secs(30));
    harness.seed_role("mod", "guild1", true).await;
    harness
        .session
        .set_members("guild1", vec![("alice", vec!["mod"])])
        .await;
    harness
        .session
        .chunk_plans
        .lock()
        .await
        .insert(community("guild1"), Vec::new());

    let (sender, receiver) = mpsc::channel(16);
    let loop_handle = tokio::spawn(Arc::clone(&harness.router).run(receiver));

    let ready = sender
        .send(PlatformEvent::SessionReady {
            communities: vec![CommunitySnapshot {
                community_id: community("guild1"),
                name: None,
                roles: vec![observation("mod", "Moderator")],
                members: Vec::new(),
            }],
        })
        .await;
    assert!(ready.is_ok());

    while harness.listeners.listener_count() == 0 {
        tokio::task::yield_now().await;
    }

    let update = sender
        .send(PlatformEvent::MemberUpdated {
            community_id: community("guild1"),
            user_id: user("bob"),
            role_ids: vec![role("mod")],
        })
        .await;
    assert!(update.is_ok());

    while harness.session.revocations().await.is_empty() {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        harness.session.revocations().await,
        vec![(community("guild1"), user("bob"), role("mod"))]
    );
    assert_eq!(harness.listeners.listener_count(), 1);

    let chunk = sender
        .send(PlatformEvent::MembersChunk(MembersChunk {
            community_id: community("guild1"),
            chunk_index: 0,
            chunk_count: 1,
            members: Vec::new(),
            nonce: None,
        }))
        .await;
    assert!(chunk.is_ok());

    while harness.session.revocations().await.len() < 2 {
        tokio::task::yield_now().await;
    }

    drop(sender);
    assert!(loop_handle.await.is_ok());
    assert_eq!(harness.listeners.listener_count(), 0);
    assert!(
        harness
            .session
            .revocations()
            .await
            .contains(&(community("guild1"), user("alice"), role("mod")))
    );
}
