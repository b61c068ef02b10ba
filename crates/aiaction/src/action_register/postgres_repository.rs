use aiaction_core::{Action, ActionName, ActionRecordId, ActionResponse, ContextId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};
use std::collections::HashMap;

use super::model::table_name;
use super::{
    ActionDetail, ActionRecord, ActionRegisterError, ActionRegisterRepository, ImageDetail,
    NewActionRecord, Result, TextDetail,
};

/// PostgreSQL implementation of ActionRegisterRepository
pub struct PostgresActionRegisterRepository {
    pool: PgPool,
}

impl PostgresActionRegisterRepository {
    /// Create a new PostgresActionRegisterRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RECORD_COLUMNS: &str = "id, action_name, action_id, success, user_id, context_id, provider, \
                              error_code, error_message, time_created, time_completed";

fn map_db_error(e: sqlx::Error) -> ActionRegisterError {
    match e {
        // string_data_right_truncation, not_null_violation, check_violation
        sqlx::Error::Database(db_err)
            if matches!(db_err.code().as_deref(), Some("22001" | "23502" | "23514")) =>
        {
            ActionRegisterError::ConstraintViolation(db_err.message().to_string())
        }
        _ => ActionRegisterError::DatabaseError(e.to_string()),
    }
}

fn record_from_row(row: &PgRow) -> Result<ActionRecord> {
    let action_name: String = row.get("action_name");
    let action_name = ActionName::parse(&action_name)
        .map_err(|e| ActionRegisterError::InvalidData(e.to_string()))?;
    let time_created: DateTime<Utc> = row.get("time_created");
    let time_completed: DateTime<Utc> = row.get("time_completed");

    Ok(ActionRecord {
        id: ActionRecordId::new(row.get("id")),
        action_name,
        action_id: row.get("action_id"),
        success: row.get("success"),
        user_id: UserId::new(row.get("user_id")),
        context_id: ContextId::new(row.get("context_id")),
        provider: row.get("provider"),
        error_code: row.get("error_code"),
        error_message: row.get("error_message"),
        time_created,
        time_completed,
    })
}

async fn insert_detail(tx: &mut Transaction<'_, Postgres>, detail: &ActionDetail) -> Result<i64> {
    let row = match detail {
        ActionDetail::GenerateText(text) | ActionDetail::SummariseText(text) => {
            let sql = format!(
                r#"
                INSERT INTO {} (
                    prompt, response_id, fingerprint, generated_content,
                    finish_reason, prompt_tokens, completion_tokens
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
                detail.table_name()
            );
            sqlx::query(&sql)
                .bind(&text.prompt)
                .bind(&text.response_id)
                .bind(&text.fingerprint)
                .bind(&text.generated_content)
                .bind(&text.finish_reason)
                .bind(text.prompt_tokens)
                .bind(text.completion_tokens)
                .fetch_one(&mut **tx)
                .await
        }
        ActionDetail::GenerateImage(image) => {
            sqlx::query(
                r#"
                INSERT INTO ai_action_generate_image (
                    prompt, number_images, quality, aspect_ratio, style,
                    source_url, revised_prompt
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(&image.prompt)
            .bind(image.number_images)
            .bind(image.quality.to_string())
            .bind(image.aspect_ratio.to_string())
            .bind(image.style.to_string())
            .bind(&image.source_url)
            .bind(&image.revised_prompt)
            .fetch_one(&mut **tx)
            .await
        }
    }
    .map_err(map_db_error)?;

    Ok(row.get("id"))
}

async fn insert_record(
    tx: &mut Transaction<'_, Postgres>,
    record: &NewActionRecord,
    action_id: i64,
) -> Result<ActionRecordId> {
    let row = sqlx::query(
        r#"
        INSERT INTO ai_action_register (
            action_name, action_id, success, user_id, context_id, provider,
            error_code, error_message, time_created, time_completed
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(record.action_name.to_string())
    .bind(action_id)
    .bind(record.success)
    .bind(record.user_id.get())
    .bind(record.context_id.get())
    .bind(&record.provider)
    .bind(record.error_code)
    .bind(&record.error_message)
    .bind(record.time_created)
    .bind(record.time_completed)
    .fetch_one(&mut **tx)
    .await
    .map_err(map_db_error)?;

    Ok(ActionRecordId::new(row.get("id")))
}

fn parse_column<T: std::str::FromStr>(row: &PgRow, column: &str) -> Result<T> {
    let value: String = row.get(column);
    value
        .parse::<T>()
        .map_err(|_| ActionRegisterError::InvalidData(format!("Invalid {}: {}", column, value)))
}

#[async_trait]
impl ActionRegisterRepository for PostgresActionRegisterRepository {
    async fn store(
        &self,
        provider: &str,
        action: &Action,
        response: &ActionResponse,
    ) -> Result<ActionRecordId> {
        let detail = ActionDetail::from_attempt(action, response);
        let record = NewActionRecord::from_attempt(provider, action, response);

        let mut tx = self.pool.begin().await.map_err(|e| {
            ActionRegisterError::DatabaseError(format!("Failed to begin transaction: {}", e))
        })?;

        let stored = async {
            let action_id = insert_detail(&mut tx, &detail).await?;
            insert_record(&mut tx, &record, action_id).await
        }
        .await;

        match stored {
            Ok(id) => {
                tx.commit().await.map_err(|e| {
                    ActionRegisterError::DatabaseError(format!("Failed to commit: {}", e))
                })?;
                Ok(id)
            }
            Err(e) => {
                tx.rollback().await.map_err(|rollback_err| {
                    ActionRegisterError::DatabaseError(format!(
                        "Failed to roll back after '{}': {}",
                        e, rollback_err
                    ))
                })?;
                Err(e)
            }
        }
    }

    async fn get(&self, id: ActionRecordId) -> Result<Option<ActionRecord>> {
        let sql = format!("SELECT {} FROM ai_action_register WHERE id = $1", RECORD_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn get_detail(&self, action: ActionName, action_id: i64) -> Result<Option<ActionDetail>> {
        match action {
            ActionName::GenerateText | ActionName::SummariseText => {
                let sql = format!(
                    r#"
                    SELECT prompt, response_id, fingerprint, generated_content,
                           finish_reason, prompt_tokens, completion_tokens
                    FROM {}
                    WHERE id = $1
                    "#,
                    table_name(action)
                );
                let row = sqlx::query(&sql)
                    .bind(action_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_db_error)?;

                Ok(row.map(|row| {
                    let text = TextDetail {
                        prompt: row.get("prompt"),
                        response_id: row.get("response_id"),
                        fingerprint: row.get("fingerprint"),
                        generated_content: row.get("generated_content"),
                        finish_reason: row.get("finish_reason"),
                        prompt_tokens: row.get("prompt_tokens"),
                        completion_tokens: row.get("completion_tokens"),
                    };
                    if action == ActionName::GenerateText {
                        ActionDetail::GenerateText(text)
                    } else {
                        ActionDetail::SummariseText(text)
                    }
                }))
            }
            ActionName::GenerateImage => {
                let row = sqlx::query(
                    r#"
                    SELECT prompt, number_images, quality, aspect_ratio, style,
                           source_url, revised_prompt
                    FROM ai_action_generate_image
                    WHERE id = $1
                    "#,
                )
                .bind(action_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_error)?;

                match row {
                    Some(row) => Ok(Some(ActionDetail::GenerateImage(ImageDetail {
                        prompt: row.get("prompt"),
                        number_images: row.get("number_images"),
                        quality: parse_column(&row, "quality")?,
                        aspect_ratio: parse_column(&row, "aspect_ratio")?,
                        style: parse_column(&row, "style")?,
                        source_url: row.get("source_url"),
                        revised_prompt: row.get("revised_prompt"),
                    }))),
                    None => Ok(None),
                }
            }
        }
    }

    async fn list(&self) -> Result<Vec<ActionRecord>> {
        let sql = format!("SELECT {} FROM ai_action_register ORDER BY id", RECORD_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.iter().map(record_from_row).collect()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ActionRecord>> {
        let sql = format!(
            "SELECT {} FROM ai_action_register WHERE user_id = $1 ORDER BY id",
            RECORD_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.iter().map(record_from_row).collect()
    }

    async fn contexts_for_user(&self, user_id: UserId) -> Result<Vec<ContextId>> {
        let rows = sqlx::query(
            "SELECT DISTINCT context_id FROM ai_action_register WHERE user_id = $1 ORDER BY context_id",
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .iter()
            .map(|row| ContextId::new(row.get("context_id")))
            .collect())
    }

    async fn users_in_context(&self, context_id: ContextId) -> Result<Vec<UserId>> {
        let rows = sqlx::query(
            "SELECT DISTINCT user_id FROM ai_action_register WHERE context_id = $1 ORDER BY user_id",
        )
        .bind(context_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.iter().map(|row| UserId::new(row.get("user_id"))).collect())
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            ActionRegisterError::DatabaseError(format!("Failed to begin transaction: {}", e))
        })?;

        let rows = sqlx::query("SELECT action_name, action_id FROM ai_action_register WHERE user_id = $1")
            .bind(user_id.get())
            .fetch_all(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let mut detail_ids: HashMap<ActionName, Vec<i64>> = HashMap::new();
        for row in &rows {
            let action: ActionName = parse_column(row, "action_name")?;
            detail_ids.entry(action).or_default().push(row.get("action_id"));
        }

        for (action, ids) in &detail_ids {
            let sql = format!("DELETE FROM {} WHERE id = ANY($1)", table_name(*action));
            sqlx::query(&sql)
                .bind(ids.as_slice())
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        let result = sqlx::query("DELETE FROM ai_action_register WHERE user_id = $1")
            .bind(user_id.get())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit()
            .await
            .map_err(|e| ActionRegisterError::DatabaseError(format!("Failed to commit: {}", e)))?;

        Ok(result.rows_affected())
    }
}
