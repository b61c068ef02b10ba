use aiaction_core::{ContextId, UserId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{PolicyCache, PolicyRepository, Result};

/// Service tracking acceptance of the AI usage policy
///
/// Acceptance facts are the source of truth. The cache only short-cuts reads,
/// so evicting an entry never resets a recorded acceptance.
///
/// Writes that fill the cache hold `erasure` shared across the fact access and
/// the cache write; erasure holds it exclusively, so a fill-back can never
/// land after the facts it was based on are gone.
#[derive(Clone)]
pub struct PolicyService {
    repository: Arc<dyn PolicyRepository>,
    cache: Arc<dyn PolicyCache>,
    erasure: Arc<RwLock<()>>,
}

impl PolicyService {
    /// Create a new PolicyService
    pub fn new(repository: Arc<dyn PolicyRepository>, cache: Arc<dyn PolicyCache>) -> Self {
        Self {
            repository,
            cache,
            erasure: Arc::default(),
        }
    }

    /// Record that a user accepted the policy in a context
    pub async fn set_policy(&self, user_id: UserId, context_id: ContextId) -> Result<bool> {
        let _guard = self.erasure.read().await;
        let acceptance = self.repository.insert(user_id, context_id).await?;
        self.cache.set(user_id, true).await?;
        info!(
            "User {} accepted the AI policy in context {} (record {})",
            user_id, context_id, acceptance.id
        );
        Ok(true)
    }

    /// Whether a user has accepted the policy
    pub async fn get_policy(&self, user_id: UserId) -> Result<bool> {
        if let Some(accepted) = self.cache.get(user_id).await? {
            return Ok(accepted);
        }

        let _guard = self.erasure.read().await;
        let accepted = self.repository.has_accepted(user_id).await?;
        debug!("Policy cache miss for user {}: accepted = {}", user_id, accepted);
        // Only positive answers are cached; a later acceptance must not be hidden.
        if accepted {
            self.cache.set(user_id, true).await?;
        }
        Ok(accepted)
    }

    /// Drop a user's cached answer
    pub async fn evict(&self, user_id: UserId) -> Result<()> {
        self.cache.delete(user_id).await
    }

    /// Contexts a user accepted the policy in
    pub async fn contexts_for_user(&self, user_id: UserId) -> Result<Vec<ContextId>> {
        self.repository.contexts_for_user(user_id).await
    }

    /// Users that accepted the policy in a context
    pub async fn users_in_context(&self, context_id: ContextId) -> Result<Vec<UserId>> {
        self.repository.users_in_context(context_id).await
    }

    /// Delete a user's acceptances and their cache entry
    pub async fn delete_for_user(&self, user_id: UserId) -> Result<u64> {
        let _guard = self.erasure.write().await;
        let deleted = self.repository.delete_for_user(user_id).await?;
        self.cache.delete(user_id).await?;
        Ok(deleted)
    }
}
