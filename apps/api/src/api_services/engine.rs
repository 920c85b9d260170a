use std::sync::Arc;
use std::time::Duration;

use rolewarden_application::{
    BootstrapSyncOrchestrator, ChunkListenerRegistry, EventRouter, FailurePolicy, FailureSource,
    GrantRepository, MembershipSnapshotCollector, PlatformSession, ProtectionAdminService,
    ProtectionReconciler, RevocationLedger, RoleRepository,
};
use rolewarden_core::AppError;
use rolewarden_infrastructure::{
    GatewayBridgeSession, PostgresGrantRepository, PostgresRoleRepository, TracingFailureSink,
};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::api_config::ApiConfig;

const PLATFORM_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Running protection engine and the handles the HTTP layer needs.
pub struct ProtectionEngine {
    pub protection_admin_service: ProtectionAdminService,
    pub gateway_session: Arc<GatewayBridgeSession>,
    router_task: JoinHandle<()>,
}

impl ProtectionEngine {
    pub async fn shutdown(self) -> Result<(), AppError> {
        self.router_task.abort();
        self.gateway_session.disconnect().await
    }
}

pub async fn start_protection_engine(
    pool: PgPool,
    config: &ApiConfig,
) -> Result<ProtectionEngine, AppError> {
    let role_repository: Arc<dyn RoleRepository> =
        Arc::new(PostgresRoleRepository::new(pool.clone()));
    let grant_repository: Arc<dyn GrantRepository> = Arc::new(PostgresGrantRepository::new(pool));
    let failure_policy = FailurePolicy::new(Arc::new(TracingFailureSink::new()));

    let http_client = reqwest::Client::builder()
        .timeout(PLATFORM_REQUEST_TIMEOUT)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let (event_sender, event_receiver) = mpsc::channel(config.event_queue_capacity);
    let gateway_session = Arc::new(GatewayBridgeSession::new(
        http_client,
        config.gateway_bridge_config(),
        event_sender,
    ));

    let identity = match gateway_session.connect().await {
        Ok(identity) => identity,
        Err(error) => {
            failure_policy.report("connect", FailureSource::Session, None, &error);
            return Err(error);
        }
    };
    let session: Arc<dyn PlatformSession> = gateway_session.clone();

    let chunk_listeners = Arc::new(ChunkListenerRegistry::new());
    let ledger = Arc::new(RevocationLedger::new(config.revocation_dedup));
    let collector = MembershipSnapshotCollector::new(
        session.clone(),
        chunk_listeners,
        config.member_chunk_timeout,
    );
    let reconciler = ProtectionReconciler::new(
        role_repository.clone(),
        grant_repository.clone(),
        session.clone(),
        collector,
        ledger.clone(),
        failure_policy.clone(),
    );
    let bootstrap = BootstrapSyncOrchestrator::new(
        role_repository.clone(),
        reconciler.clone(),
        failure_policy.clone(),
    );
    let event_router = Arc::new(EventRouter::new(
        role_repository.clone(),
        grant_repository.clone(),
        reconciler,
        bootstrap,
        failure_policy.clone(),
    ));
    let router_task = tokio::spawn(event_router.run(event_receiver));

    info!(
        bot_user_id = %identity.user_id,
        bot_username = %identity.username,
        "protection engine started"
    );

    Ok(ProtectionEngine {
        protection_admin_service: ProtectionAdminService::new(
            role_repository,
            grant_repository,
            session,
            ledger,
            failure_policy,
        ),
        gateway_session,
        router_task,
    })
}
