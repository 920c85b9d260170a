use rolewarden_application::{AuthorizationChange, GrantRecord};
use rolewarden_domain::ProtectedRole;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// Status of one health dependency.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// API representation of a role record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/protected-role-response.ts"
)]
pub struct ProtectedRoleResponse {
    pub role_id: String,
    pub community_id: String,
    pub name: String,
    pub color: i32,
    pub is_protected: bool,
}

impl From<ProtectedRole> for ProtectedRoleResponse {
    fn from(value: ProtectedRole) -> Self {
        Self {
            role_id: value.role_id().to_string(),
            community_id: value.community_id().to_string(),
            name: value.name().to_owned(),
            color: value.color(),
            is_protected: value.is_protected(),
        }
    }
}

/// API representation of an authorization grant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-response.ts"
)]
pub struct GrantResponse {
    pub user_id: String,
    pub community_id: String,
    pub role_id: String,
    pub granted_at: String,
}

impl From<GrantRecord> for GrantResponse {
    fn from(value: GrantRecord) -> Self {
        Self {
            user_id: value.grant.user_id().to_string(),
            community_id: value.grant.community_id().to_string(),
            role_id: value.grant.role_id().to_string(),
            granted_at: value.granted_at,
        }
    }
}

/// Result of adding or removing an authorization.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/authorization-change-response.ts"
)]
pub struct AuthorizationChangeResponse {
    pub user_id: String,
    pub community_id: String,
    pub role_id: String,
    pub platform_synced: bool,
}

impl From<AuthorizationChange> for AuthorizationChangeResponse {
    fn from(value: AuthorizationChange) -> Self {
        Self {
            user_id: value.grant.user_id().to_string(),
            community_id: value.grant.community_id().to_string(),
            role_id: value.grant.role_id().to_string(),
            platform_synced: value.platform_synced,
        }
    }
}
