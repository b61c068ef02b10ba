use async_trait::async_trait;
use sqlx::{Row, postgres::PgPool};

use super::{PluginConfigError, PluginConfigRepository, Result};

/// PostgreSQL implementation of PluginConfigRepository
pub struct PostgresPluginConfigRepository {
    pool: PgPool,
}

impl PostgresPluginConfigRepository {
    /// Create a new PostgresPluginConfigRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PluginConfigRepository for PostgresPluginConfigRepository {
    async fn get(&self, plugin: &str, name: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM ai_plugin_config WHERE plugin = $1 AND name = $2")
            .bind(plugin)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PluginConfigError::DatabaseError(e.to_string()))?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn set(&self, plugin: &str, name: &str, value: &str) -> Result<()> {
        if plugin.is_empty() || name.is_empty() {
            return Err(PluginConfigError::InvalidKey(format!("{}/{}", plugin, name)));
        }

        sqlx::query(
            r#"
            INSERT INTO ai_plugin_config (plugin, name, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (plugin, name) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(plugin)
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| PluginConfigError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn unset(&self, plugin: &str, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ai_plugin_config WHERE plugin = $1 AND name = $2")
            .bind(plugin)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| PluginConfigError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
