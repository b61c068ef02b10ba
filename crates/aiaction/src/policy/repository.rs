use aiaction_core::{ContextId, UserId};
use async_trait::async_trait;

use super::{PolicyAcceptance, Result};

/// Repository trait for policy acceptance facts
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Record an acceptance
    async fn insert(&self, user_id: UserId, context_id: ContextId) -> Result<PolicyAcceptance>;

    /// Whether the user has any recorded acceptance
    async fn has_accepted(&self, user_id: UserId) -> Result<bool>;

    /// Distinct contexts a user accepted the policy in
    async fn contexts_for_user(&self, user_id: UserId) -> Result<Vec<ContextId>>;

    /// Distinct users that accepted the policy in a context
    async fn users_in_context(&self, context_id: ContextId) -> Result<Vec<UserId>>;

    /// Delete all acceptances of a user, returning the number removed
    async fn delete_for_user(&self, user_id: UserId) -> Result<u64>;
}
