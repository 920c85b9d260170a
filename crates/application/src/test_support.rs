use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rolewarden_core::{AppError, AppResult};
use rolewarden_domain::{
    AuthorizationGrant, CommunityId, MemberSnapshot, MembersChunk, ProtectedRole, RoleId,
    RoleObservation, UserId,
};
use tokio::sync::Mutex;

use crate::{
    BootstrapSyncOrchestrator, ChunkListenerRegistry, EventRouter, FailurePolicy, FailureRecord,
    FailureSink, GrantRecord, GrantRepository, MembershipSnapshotCollector, PlatformSession,
    ProtectionAdminService, ProtectionReconciler, RevocationLedger, RoleRepository,
    SessionIdentity,
};

pub(crate) fn community(value: &str) -> CommunityId {
    CommunityId::new(value).unwrap_or_else(|error| panic!("invalid community id: {error}"))
}

pub(crate) fn role(value: &str) -> RoleId {
    RoleId::new(value).unwrap_or_else(|error| panic!("invalid role id: {error}"))
}

pub(crate) fn user(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|error| panic!("invalid user id: {error}"))
}

pub(crate) type Revocation = (CommunityId, UserId, RoleId);

#[derive(Default)]
pub(crate) struct RecordingFailureSink {
    records: std::sync::Mutex<Vec<FailureRecord>>,
}

impl RecordingFailureSink {
    pub(crate) fn records(&self) -> Vec<FailureRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl FailureSink for RecordingFailureSink {
    fn record(&self, failure: &FailureRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(failure.clone());
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeRoleRepository {
    pub(crate) roles: Mutex<HashMap<RoleId, ProtectedRole>>,
    pub(crate) failing_lookups: Mutex<HashSet<RoleId>>,
}

impl FakeRoleRepository {
    pub(crate) async fn insert(&self, role: ProtectedRole) {
        self.roles.lock().await.insert(role.role_id().clone(), role);
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn upsert_role(
        &self,
        community_id: &CommunityId,
        role: &RoleObservation,
    ) -> AppResult<()> {
        self.roles
            .lock()
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
        let mut roles = self.roles.lock().await;
        let refreshed = match roles.get(&role.role_id) {
            Some(existing) => existing.refreshed(role),
            None => ProtectedRole::observed(community_id.clone(), role),
        };
        roles.insert(role.role_id.clone(), refreshed);
        Ok(())
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        self.roles.lock().await.remove(role_id);
        Ok(())
    }

    async fn list_roles(&self, community_id: &CommunityId) -> AppResult<Vec<ProtectedRole>> {
        let mut roles: Vec<ProtectedRole> = self
            .roles
            .lock()
            .await
            .values()
            .filter(|role| role.community_id() == community_id)
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.role_id().cmp(right.role_id()));
        Ok(roles)
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<ProtectedRole>> {
        if self.failing_lookups.lock().await.contains(role_id) {
            return Err(AppError::Internal(format!(
                "simulated lookup failure for role '{role_id}'"
            )));
        }

        Ok(self.roles.lock().await.get(role_id).cloned())
    }

    async fn toggle_protected(&self, role_id: &RoleId) -> AppResult<ProtectedRole> {
        let mut roles = self.roles.lock().await;
        let toggled = roles
            .get(role_id)
            .map(ProtectedRole::toggled)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;
        roles.insert(role_id.clone(), toggled.clone());
        Ok(toggled)
    }
}

#[derive(Default)]
pub(crate) struct FakeGrantRepository {
    pub(crate) grants: Mutex<HashSet<AuthorizationGrant>>,
}

impl FakeGrantRepository {
    pub(crate) async fn insert(&self, user_id: &str, community_id: &str, role_id: &str) {
        self.grants.lock().await.insert(AuthorizationGrant::new(
            user(user_id),
            community(community_id),
            role(role_id),
        ));
    }

    pub(crate) async fn count(&self) -> usize {
        self.grants.lock().await.len()
    }
}

#[async_trait]
impl GrantRepository for FakeGrantRepository {
    async fn upsert_grant(&self, grant: &AuthorizationGrant) -> AppResult<()> {
        self.grants.lock().await.insert(grant.clone());
        Ok(())
    }

    async fn find_grant(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        role_id: &RoleId,
    ) -> AppResult<Option<AuthorizationGrant>> {
        let key = AuthorizationGrant::new(user_id.clone(), community_id.clone(), role_id.clone());
        Ok(self.grants.lock().await.get(&key).cloned())
    }

    async fn delete_grant(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        role_id: &RoleId,
    ) -> AppResult<bool> {
        let key = AuthorizationGrant::new(user_id.clone(), community_id.clone(), role_id.clone());
        Ok(self.grants.lock().await.remove(&key))
    }

    async fn delete_member_grants(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> AppResult<u64> {
        let mut grants = self.grants.lock().await;
        let before = grants.len();
        grants.retain(|grant| grant.user_id() != user_id || grant.community_id() != community_id);
        Ok(u64::try_from(before - grants.len()).unwrap_or(u64::MAX))
    }

    async fn delete_community_grants(&self, community_id: &CommunityId) -> AppResult<u64> {
        let mut grants = self.grants.lock().await;
        let before = grants.len();
        grants.retain(|grant| grant.community_id() != community_id);
        Ok(u64::try_from(before - grants.len()).unwrap_or(u64::MAX))
    }

    async fn list_grants(&self, community_id: &CommunityId) -> AppResult<Vec<GrantRecord>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| grant.community_id() == community_id)
            .map(|grant| GrantRecord {
                grant: grant.clone(),
                granted_at: "2026-01-01T00:00:00Z".to_owned(),
            })
            .collect())
    }
}

/// Fake session that answers chunk requests by feeding the listener registry.
pub(crate) struct FakePlatformSession {
    listeners: Arc<ChunkListenerRegistry>,
    pub(crate) members: Arc<Mutex<HashMap<CommunityId, Vec<MemberSnapshot>>>>,
    pub(crate) final_chunk_rosters: Mutex<HashMap<CommunityId, Vec<MemberSnapshot>>>,
    pub(crate) chunk_plans: Mutex<HashMap<CommunityId, Vec<(u32, u32)>>>,
    pub(crate) chunk_requests: Mutex<Vec<(CommunityId, String)>>,
    pub(crate) revocations: Mutex<Vec<Revocation>>,
    pub(crate) role_grants: Mutex<Vec<Revocation>>,
    pub(crate) failing_revocations: Mutex<HashSet<RoleId>>,
    pub(crate) fail_role_grants: Mutex<bool>,
}

impl FakePlatformSession {
    pub(crate) fn new(listeners: Arc<ChunkListenerRegistry>) -> Self {
        Self {
            listeners,
            members: Arc::new(Mutex::new(HashMap::new())),
            final_chunk_rosters: Mutex::new(HashMap::new()),
            chunk_plans: Mutex::new(HashMap::new()),
            chunk_requests: Mutex::new(Vec::new()),
            revocations: Mutex::new(Vec::new()),
            role_grants: Mutex::new(Vec::new()),
            failing_revocations: Mutex::new(HashSet::new()),
            fail_role_grants: Mutex::new(false),
        }
    }

    pub(crate) async fn set_members(&self, community_id: &str, members: Vec<(&str, Vec<&str>)>) {
        let members = members
            .into_iter()
            .map(|(user_id, role_ids)| {
                MemberSnapshot::new(user(user_id), role_ids.into_iter().map(role).collect())
            })
            .collect();
        self.members
            .lock()
            .await
            .insert(community(community_id), members);
    }

    pub(crate) async fn revocations(&self) -> Vec<Revocation> {
        self.revocations.lock().await.clone()
    }

    pub(crate) async fn revocations_of(&self, role_id: &str) -> usize {
        let role_id = role(role_id);
        self.revocations
            .lock()
            .await
            .iter()
            .filter(|(_, _, revoked)| revoked == &role_id)
            .count()
    }
}

#[async_trait]
impl PlatformSession for FakePlatformSession {
    async fn connect(&self) -> AppResult<SessionIdentity> {
        Ok(SessionIdentity {
            user_id: user("warden"),
            username: "warden".to_owned(),
        })
    }

    async fn disconnect(&self) -> AppResult<()> {
        Ok(())
    }

    async fn request_membership_chunks(
        &self,
        community_id: &CommunityId,
        nonce: &str,
    ) -> AppResult<()> {
        self.chunk_requests
            .lock()
            .await
            .push((community_id.clone(), nonce.to_owned()));

        let plan = self
            .chunk_plans
            .lock()
            .await
            .get(community_id)
            .cloned()
            .unwrap_or_else(|| vec![(0, 1)]);
        let final_roster = self.final_chunk_rosters.lock().await.remove(community_id);
        let listeners = Arc::clone(&self.listeners);
        let members = Arc::clone(&self.members);
        let community_id = community_id.clone();
        let nonce = nonce.to_owned();

        tokio::spawn(async move {
            let mut final_roster = final_roster;
            for (chunk_index, chunk_count) in plan {
                tokio::task::yield_now().await;
                let chunk = MembersChunk {
                    community_id: community_id.clone(),
                    chunk_index,
                    chunk_count,
                    members: Vec::new(),
                    nonce: Some(nonce.clone()),
                };
                if chunk.is_final()
                    && let Some(roster) = final_roster.take()
                {
                    members.lock().await.insert(community_id.clone(), roster);
                }
                listeners.observe_chunk(&chunk);
            }
        });

        Ok(())
    }

    async fn revoke_role(
        &self,
        community_id: &CommunityId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()> {
        if self.failing_revocations.lock().await.contains(role_id) {
            return Err(AppError::Platform(format!(
                "simulated revoke failure for role '{role_id}'"
            )));
        }

        self.revocations.lock().await.push((
            community_id.clone(),
            user_id.clone(),
            role_id.clone(),
        ));
        Ok(())
    }

    async fn grant_role(
        &self,
        community_id: &CommunityId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()> {
        if *self.fail_role_grants.lock().await {
            return Err(AppError::Platform("simulated grant failure".to_owned()));
        }

        self.role_grants.lock().await.push((
            community_id.clone(),
            user_id.clone(),
            role_id.clone(),
        ));
        Ok(())
    }

    async fn cached_members(&self, community_id: &CommunityId) -> AppResult<Vec<MemberSnapshot>> {
        Ok(self
            .members
            .lock()
            .await
            .get(community_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Fully wired engine over fakes.
pub(crate) struct EngineHarness {
    pub(crate) roles: Arc<FakeRoleRepository>,
    pub(crate) grants: Arc<FakeGrantRepository>,
    pub(crate) session: Arc<FakePlatformSession>,
    pub(crate) listeners: Arc<ChunkListenerRegistry>,
    pub(crate) failures: Arc<RecordingFailureSink>,
    pub(crate) reconciler: ProtectionReconciler,
    pub(crate) bootstrap: BootstrapSyncOrchestrator,
    pub(crate) router: Arc<EventRouter>,
    pub(crate) admin: ProtectionAdminService,
}

impl EngineHarness {
    pub(crate) fn new() -> Self {
        Self::with_chunk_timeout(Duration::from_secs(5))
    }

    pub(crate) fn with_chunk_timeout(chunk_timeout: Duration) -> Self {
        let roles = Arc::new(FakeRoleRepository::default());
        let grants = Arc::new(FakeGrantRepository::default());
        let listeners = Arc::new(ChunkListenerRegistry::new());
        let session = Arc::new(FakePlatformSession::new(Arc::clone(&listeners)));
        let failures = Arc::new(RecordingFailureSink::default());
        let failure_policy = FailurePolicy::new(failures.clone());
        let ledger = Arc::new(RevocationLedger::new(Duration::from_secs(60)));

        let collector =
            MembershipSnapshotCollector::new(session.clone(), Arc::clone(&listeners), chunk_timeout);
        let reconciler = ProtectionReconciler::new(
            roles.clone(),
            grants.clone(),
            session.clone(),
            collector,
            Arc::clone(&ledger),
            failure_policy.clone(),
        );
        let bootstrap = BootstrapSyncOrchestrator::new(
            roles.clone(),
            reconciler.clone(),
            failure_policy.clone(),
        );
        let router = Arc::new(EventRouter::new(
            roles.clone(),
            grants.clone(),
            reconciler.clone(),
            bootstrap.clone(),
            failure_policy.clone(),
        ));
        let admin = ProtectionAdminService::new(
            roles.clone(),
            grants.clone(),
            session.clone(),
            ledger,
            failure_policy,
        );

        Self {
            roles,
            grants,
            session,
            listeners,
            failures,
            reconciler,
            bootstrap,
            router,
            admin,
        }
    }

    pub(crate) async fn seed_role(&self, role_id: &str, community_id: &str, is_protected: bool) {
        self.roles
            .insert(ProtectedRole::new(
                role(role_id),
                community(community_id),
                role_id,
                0,
                is_protected,
            ))
            .await;
    }
}
