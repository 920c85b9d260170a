use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use rolewarden_application::RoleRepository;
use rolewarden_core::{AppError, AppResult};
use rolewarden_domain::{CommunityId, ProtectedRole, RoleId, RoleObservation};

/// PostgreSQL-backed repository for role records.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProtectedRoleRow {
    role_id: String,
    community_id: String,
    name: String,
    color: i32,
    is_protected: bool,
}

impl TryFrom<ProtectedRoleRow> for ProtectedRole {
    type Error = AppError;

    fn try_from(row: ProtectedRoleRow) -> Result<Self, Self::Error> {
        Ok(ProtectedRole::new(
            RoleId::new(row.role_id)?,
            CommunityId::new(row.community_id)?,
            row.name,
            row.color,
            row.is_protected,
        ))
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn upsert_role(
        &self,
        community_id: &CommunityId,
        role: &RoleObservation,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO protected_roles (role_id, community_id, name, color)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (role_id) DO NOTHING
            "#,
        )
        .bind(role.role_id.as_str())
        .bind(community_id.as_str())
        .bind(role.name.as_str())
        .bind(role.color)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to upsert role '{}' in community '{}': {error}",
                role.role_id, community_id
            ))
        })?;

        Ok(())
    }

    async fn refresh_role(
        &self,
        community_id: &CommunityId,
        role: &RoleObservation,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO protected_roles (role_id, community_id, name, color)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (role_id)
            DO UPDATE SET
                name = EXCLUDED.name,
                color = EXCLUDED.color
            "#,
        )
        .bind(role.role_id.as_str())
        .bind(community_id.as_str())
        .bind(role.name.as_str())
        .bind(role.color)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to refresh role '{}' in community '{}': {error}",
                role.role_id, community_id
            ))
        })?;

        Ok(())
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM protected_roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete role '{role_id}': {error}"))
        })?;

        Ok(())
    }

    async fn list_roles(&self, community_id: &CommunityId) -> AppResult<Vec<ProtectedRole>> {
        let rows = sqlx::query_as::<_, ProtectedRoleRow>(
            r#"
            SELECT role_id, community_id, name, color, is_protected
            FROM protected_roles
            WHERE community_id = $1
            ORDER BY name, role_id
            "#,
        )
        .bind(community_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list roles for community '{community_id}': {error}"
            ))
        })?;

        rows.into_iter().map(ProtectedRole::try_from).collect()
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<ProtectedRole>> {
        let row = sqlx::query_as::<_, ProtectedRoleRow>(
            r#"
            SELECT role_id, community_id, name, color, is_protected
            FROM protected_roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role '{role_id}': {error}")))?;

        row.map(ProtectedRole::try_from).transpose()
    }

    async fn toggle_protected(&self, role_id: &RoleId) -> AppResult<ProtectedRole> {
        let row = sqlx::query_as::<_, ProtectedRoleRow>(
            r#"
            UPDATE protected_roles
            SET is_protected = NOT is_protected
            WHERE role_id = $1
            RETURNING role_id, community_id, name, color, is_protected
            "#,
        )
        .bind(role_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to toggle protection for role '{role_id}': {error}"
            ))
        })?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        ProtectedRole::try_from(row)
    }
}
