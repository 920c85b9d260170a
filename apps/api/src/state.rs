use std::sync::Arc;

use rolewarden_application::ProtectionAdminService;
use rolewarden_infrastructure::GatewayBridgeSession;
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub protection_admin_service: ProtectionAdminService,
    pub gateway_session: Arc<GatewayBridgeSession>,
    pub postgres_pool: PgPool,
    pub admin_api_token: String,
    pub gateway_bridge_secret: String,
}
