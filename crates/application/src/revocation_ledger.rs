use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rolewarden_domain::{CommunityId, RoleId, UserId};
use tokio::time::Instant;

type RevocationKey = (CommunityId, UserId, RoleId);

/// Short-lived memory of revoke calls the platform accepted.
///
/// While an entry is live, repeated reconciliation of the same holder skips
/// the remote call; the platform's follow-up member update clears it.
#[derive(Debug)]
pub struct RevocationLedger {
    entries: Mutex<HashMap<RevocationKey, Instant>>,
    ttl: Duration,
}

impl RevocationLedger {
    /// Creates a ledger keeping entries for `ttl`. A zero ttl disables it.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns whether a revoke for the triple was issued and is still live.
    pub fn is_pending(
        &self,
        community_id: &CommunityId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> bool {
        let key = (community_id.clone(), user_id.clone(), role_id.clone());
        let mut entries = self.lock_entries();

        match entries.get(&key) {
            Some(expires_at) if *expires_at > Instant::now() => true,
            Some(_) => {
                entries.remove(&key);
                false
            }
            None => false,
        }
    }

    /// Remembers a revoke the platform accepted.
    pub fn record(&self, community_id: &CommunityId, user_id: &UserId, role_id: &RoleId) {
        if self.ttl.is_zero() {
            return;
        }

        let now = Instant::now();
        let expires_at = now.checked_add(self.ttl).unwrap_or(now);
        self.lock_entries().insert(
            (community_id.clone(), user_id.clone(), role_id.clone()),
            expires_at,
        );
    }

    /// Forgets the entry for one triple.
    pub fn clear(&self, community_id: &CommunityId, user_id: &UserId, role_id: &RoleId) {
        self.lock_entries()
            .remove(&(community_id.clone(), user_id.clone(), role_id.clone()));
    }

    /// Drops entries of a member for roles the member no longer holds.
    pub fn retain_held(&self, community_id: &CommunityId, user_id: &UserId, held: &[RoleId]) {
        let now = Instant::now();
        self.lock_entries()
            .retain(|(entry_community, entry_user, entry_role), expires_at| {
                if *expires_at <= now {
                    return false;
                }

                entry_community != community_id
                    || entry_user != user_id
                    || held.contains(entry_role)
            });
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<RevocationKey, Instant>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
