use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{FromRow, PgPool};

use rolewarden_application::{GrantRecord, GrantRepository};
use rolewarden_core::{AppError, AppResult};
use rolewarden_domain::{AuthorizationGrant, CommunityId, RoleId, UserId};

/// PostgreSQL-backed repository for authorization grants.
#[derive(Clone)]
pub struct PostgresGrantRepository {
    pool: PgPool,
}

impl PostgresGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    user_id: String,
    community_id: String,
    role_id: String,
    granted_at: DateTime<Utc>,
}

impl GrantRow {
    fn into_grant(self) -> AppResult<AuthorizationGrant> {
        Ok(AuthorizationGrant::new(
            UserId::new(self.user_id)?,
            CommunityId::new(self.community_id)?,
            RoleId::new(self.role_id)?,
        ))
    }

    fn into_record(self) -> AppResult<GrantRecord> {
        let granted_at = self.granted_at.to_rfc3339_opts(SecondsFormat::Secs, true);

        Ok(GrantRecord {
            grant: self.into_grant()?,
            granted_at,
        })
    }
}

#[async_trait]
impl GrantRepository for PostgresGrantRepository {
    async fn upsert_grant(&self, grant: &AuthorizationGrant) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO authorization_grants (user_id, community_id, role_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, community_id, role_id) DO NOTHING
            "#,
        )
        .bind(grant.user_id().as_str())
        .bind(grant.community_id().as_str())
        .bind(grant.role_id().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to record grant of role '{}' to user '{}' in community '{}': {error}",
                grant.role_id(),
                grant.user_id(),
                grant.community_id()
            ))
        })?;

        Ok(())
    }

    async fn find_grant(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        role_id: &RoleId,
    ) -> AppResult<Option<AuthorizationGrant>> {
        let row = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT user_id, community_id, role_id, granted_at
            FROM authorization_grants
            WHERE user_id = $1 AND community_id = $2 AND role_id = $3
            "#,
        )
        .bind(user_id.as_str())
        .bind(community_id.as_str())
        .bind(role_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find grant of role '{role_id}' to user '{user_id}' in community '{community_id}': {error}"
            ))
        })?;

        row.map(GrantRow::into_grant).transpose()
    }

    async fn delete_grant(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
        role_id: &RoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM authorization_grants
            WHERE user_id = $1 AND community_id = $2 AND role_id = $3
            "#,
        )
        .bind(user_id.as_str())
        .bind(community_id.as_str())
        .bind(role_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete grant of role '{role_id}' to user '{user_id}' in community '{community_id}': {error}"
            ))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_member_grants(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM authorization_grants
            WHERE user_id = $1 AND community_id = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(community_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete grants of user '{user_id}' in community '{community_id}': {error}"
            ))
        })?;

        Ok(result.rows_affected())
    }

    async fn delete_community_grants(&self, community_id: &CommunityId) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM authorization_grants
            WHERE community_id = $1
            "#,
        )
        .bind(community_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete grants of community '{community_id}': {error}"
            ))
        })?;

        Ok(result.rows_affected())
    }

    async fn list_grants(&self, community_id: &CommunityId) -> AppResult<Vec<GrantRecord>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT user_id, community_id, role_id, granted_at
            FROM authorization_grants
            WHERE community_id = $1
            ORDER BY granted_at, user_id, role_id
            "#,
        )
        .bind(community_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list grants for community '{community_id}': {error}"
            ))
        })?;

        rows.into_iter().map(GrantRow::into_record).collect()
    }
}
