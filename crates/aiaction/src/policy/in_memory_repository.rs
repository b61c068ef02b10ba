use aiaction_core::{ContextId, UserId};
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{PolicyAcceptance, PolicyRepository, Result};

#[derive(Default)]
struct Acceptances {
    rows: Vec<PolicyAcceptance>,
    next_id: i64,
}

/// In-memory implementation of PolicyRepository
#[derive(Clone, Default)]
pub struct InMemoryPolicyRepository {
    acceptances: Arc<RwLock<Acceptances>>,
}

impl InMemoryPolicyRepository {
    /// Create a new in-memory policy repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyRepository for InMemoryPolicyRepository {
    async fn insert(&self, user_id: UserId, context_id: ContextId) -> Result<PolicyAcceptance> {
        let mut acceptances = self.acceptances.write().await;
        acceptances.next_id += 1;
        let acceptance = PolicyAcceptance {
            id: acceptances.next_id,
            user_id,
            context_id,
            time_accepted: Utc::now().trunc_subsecs(0),
        };
        acceptances.rows.push(acceptance.clone());
        Ok(acceptance)
    }

    async fn has_accepted(&self, user_id: UserId) -> Result<bool> {
        let acceptances = self.acceptances.read().await;
        Ok(acceptances.rows.iter().any(|a| a.user_id == user_id))
    }

    async fn contexts_for_user(&self, user_id: UserId) -> Result<Vec<ContextId>> {
        let acceptances = self.acceptances.read().await;
        let contexts: BTreeSet<ContextId> = acceptances
            .rows
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.context_id)
            .collect();
        Ok(contexts.into_iter().collect())
    }

    async fn users_in_context(&self, context_id: ContextId) -> Result<Vec<UserId>> {
        let acceptances = self.acceptances.read().await;
        let users: BTreeSet<UserId> = acceptances
            .rows
            .iter()
            .filter(|a| a.context_id == context_id)
            .map(|a| a.user_id)
            .collect();
        Ok(users.into_iter().collect())
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64> {
        let mut acceptances = self.acceptances.write().await;
        let before = acceptances.rows.len();
        acceptances.rows.retain(|a| a.user_id != user_id);
        Ok((before - acceptances.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_has_accepted() {
        let repo = InMemoryPolicyRepository::new();
        assert!(!repo.has_accepted(UserId::new(1)).await.unwrap());

        let first = repo.insert(UserId::new(1), ContextId::new(5)).await.unwrap();
        let second = repo.insert(UserId::new(2), ContextId::new(5)).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        assert!(repo.has_accepted(UserId::new(1)).await.unwrap());
        assert_eq!(
            repo.users_in_context(ContextId::new(5)).await.unwrap(),
            vec![UserId::new(1), UserId::new(2)]
        );
    }

    #[tokio::test]
    async fn test_delete_for_user() {
        let repo = InMemoryPolicyRepository::new();
        repo.insert(UserId::new(1), ContextId::new(5)).await.unwrap();
        repo.insert(UserId::new(1), ContextId::new(6)).await.unwrap();
        repo.insert(UserId::new(2), ContextId::new(5)).await.unwrap();

        assert_eq!(
            repo.contexts_for_user(UserId::new(1)).await.unwrap(),
            vec![ContextId::new(5), ContextId::new(6)]
        );
        assert_eq!(repo.delete_for_user(UserId::new(1)).await.unwrap(), 2);
        assert!(!repo.has_accepted(UserId::new(1)).await.unwrap());
        assert!(repo.has_accepted(UserId::new(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryPolicyRepository::new();
        repo.insert(UserId::new(1), ContextId::new(5)).await.unwrap();
        let second = repo.insert(UserId::new(2), ContextId::new(5)).await.unwrap();
        assert_eq!(second.id, 2);

        repo.delete_for_user(UserId::new(2)).await.unwrap();
        let third = repo.insert(UserId::new(3), ContextId::new(5)).await.unwrap();

        assert_eq!(third.id, 3);
    }
}
