use std::sync::Arc;

use rolewarden_domain::{CommunityId, CommunitySnapshot};
use tracing::info;

use crate::{FailurePolicy, FailureSource, ProtectionReconciler, RoleRepository};

/// Outcome of a startup sync across all communities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Communities whose roster was fully reconciled.
    pub reconciled: Vec<CommunityId>,
    /// Communities skipped because their roster could not be collected.
    pub skipped: Vec<CommunityId>,
    /// Revoke calls issued across all communities.
    pub revocations: usize,
    /// Role seeding failures.
    pub seeding_failures: usize,
}

/// Seeds role records and reconciles every community after session start.
#[derive(Clone)]
pub struct BootstrapSyncOrchestrator {
    role_repository: Arc<dyn RoleRepository>,
    reconciler: ProtectionReconciler,
    failure_policy: FailurePolicy,
}

impl BootstrapSyncOrchestrator {
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        reconciler: ProtectionReconciler,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            role_repository,
            reconciler,
            failure_policy,
        }
    }

    /// Syncs communities one after another.
    ///
    /// Roles of a community are seeded before its roster is reconciled, so
    /// reconciliation reads current protection flags.
    pub async fn run(&self, communities: &[CommunitySnapshot]) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        for community in communities {
            report.seeding_failures += self.seed_roles(community).await;

            match self
                .reconciler
                .reconcile_community(&community.community_id)
                .await
            {
                Ok(outcome) => {
                    report.revocations += outcome.revocations;
                    report.reconciled.push(community.community_id.clone());
                }
                Err(error) => {
                    self.failure_policy.report(
                        "reconcile_community",
                        FailureSource::Snapshot,
                        Some(&community.community_id),
                        &error,
                    );
                    report.skipped.push(community.community_id.clone());
                }
            }
        }

        info!(
            reconciled = report.reconciled.len(),
            skipped = report.skipped.len(),
            revocations = report.revocations,
            "bootstrap sync finished"
        );

        report
    }

    /// Upserts every observed role of a community, returning the failure count.
    pub async fn seed_roles(&self, community: &CommunitySnapshot) -> usize {
        let mut failures = 0;

        for role in &community.roles {
            if let Err(error) = self
                .role_repository
                .upsert_role(&community.community_id, role)
                .await
            {
                self.failure_policy.report(
                    "upsert_role",
                    FailureSource::Store,
                    Some(&community.community_id),
                    &error,
                );
                failures += 1;
            }
        }

        failures
    }
}
