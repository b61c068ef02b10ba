use aiaction_core::{ContextId, UserId};
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::{Row, postgres::PgPool};

use super::{PolicyAcceptance, PolicyError, PolicyRepository, Result};

/// PostgreSQL implementation of PolicyRepository
pub struct PostgresPolicyRepository {
    pool: PgPool,
}

impl PostgresPolicyRepository {
    /// Create a new PostgresPolicyRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PolicyRepository for PostgresPolicyRepository {
    async fn insert(&self, user_id: UserId, context_id: ContextId) -> Result<PolicyAcceptance> {
        let time_accepted = Utc::now().trunc_subsecs(0);

        let row = sqlx::query(
            r#"
            INSERT INTO ai_policy_register (user_id, context_id, time_accepted)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id.get())
        .bind(context_id.get())
        .bind(time_accepted)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PolicyError::DatabaseError(e.to_string()))?;

        Ok(PolicyAcceptance {
            id: row.get("id"),
            user_id,
            context_id,
            time_accepted,
        })
    }

    async fn has_accepted(&self, user_id: UserId) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM ai_policy_register WHERE user_id = $1) AS accepted",
        )
        .bind(user_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PolicyError::DatabaseError(e.to_string()))?;

        Ok(row.get("accepted"))
    }

    async fn contexts_for_user(&self, user_id: UserId) -> Result<Vec<ContextId>> {
        let rows = sqlx::query(
            "SELECT DISTINCT context_id FROM ai_policy_register WHERE user_id = $1 ORDER BY context_id",
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PolicyError::DatabaseError(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| ContextId::new(row.get("context_id")))
            .collect())
    }

    async fn users_in_context(&self, context_id: ContextId) -> Result<Vec<UserId>> {
        let rows = sqlx::query(
            "SELECT DISTINCT user_id FROM ai_policy_register WHERE context_id = $1 ORDER BY user_id",
        )
        .bind(context_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PolicyError::DatabaseError(e.to_string()))?;

        Ok(rows.iter().map(|row| UserId::new(row.get("user_id"))).collect())
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM ai_policy_register WHERE user_id = $1")
            .bind(user_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| PolicyError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
