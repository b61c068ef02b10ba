use aiaction_core::{Action, ActionName, ActionRecordId, ActionResponse, ContextId, UserId};
use async_trait::async_trait;

use super::{ActionDetail, ActionRecord, Result};

/// Repository trait for the action register
#[async_trait]
pub trait ActionRegisterRepository: Send + Sync {
    /// Store one attempt: the detail row and the envelope pointing at it
    ///
    /// Both rows are written in one transaction. On error neither row exists.
    async fn store(
        &self,
        provider: &str,
        action: &Action,
        response: &ActionResponse,
    ) -> Result<ActionRecordId>;

    /// Get an envelope row by ID
    async fn get(&self, id: ActionRecordId) -> Result<Option<ActionRecord>>;

    /// Get the detail row an envelope points to
    async fn get_detail(&self, action: ActionName, action_id: i64) -> Result<Option<ActionDetail>>;

    /// List all envelope rows, oldest first
    async fn list(&self) -> Result<Vec<ActionRecord>>;

    /// List the envelope rows of one user, oldest first
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ActionRecord>>;

    /// Distinct contexts a user requested actions in
    async fn contexts_for_user(&self, user_id: UserId) -> Result<Vec<ContextId>>;

    /// Distinct users that requested actions in a context
    async fn users_in_context(&self, context_id: ContextId) -> Result<Vec<UserId>>;

    /// Delete all rows of a user, returning the number of envelope rows removed
    async fn delete_for_user(&self, user_id: UserId) -> Result<u64>;
}
