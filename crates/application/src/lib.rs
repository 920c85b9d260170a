//! Application services and ports.

#![forbid(unsafe_code)]

mod bootstrap_service;
mod event_router;
mod failure_policy;
mod platform_ports;
mod protection_admin_service;
mod protection_ports;
mod protection_reconciler;
mod revocation_ledger;
mod snapshot_collector;

#[cfg(test)]
mod test_support;

pub use bootstrap_service::{BootstrapReport, BootstrapSyncOrchestrator};
pub use event_router::EventRouter;
pub use failure_policy::{
    FailureDisposition, FailurePolicy, FailureRecord, FailureSink, FailureSource,
};
pub use platform_ports::{PlatformSession, SessionIdentity};
pub use protection_admin_service::{AuthorizationChange, ProtectionAdminService};
pub use protection_ports::{GrantRecord, GrantRepository, RoleRepository};
pub use protection_reconciler::{
    CommunityReconciliation, MemberReconciliation, ProtectionReconciler,
};
pub use revocation_ledger::RevocationLedger;
pub use snapshot_collector::{ChunkListenerRegistry, MembershipSnapshotCollector};
