use aiaction_core::{Action, ActionName, ActionRecordId, ActionResponse, ContextId, UserId};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    ActionDetail, ActionRecord, ActionRegisterRepository, NewActionRecord, Result,
};

#[derive(Default)]
struct Tables {
    records: BTreeMap<i64, ActionRecord>,
    details: HashMap<ActionName, BTreeMap<i64, ActionDetail>>,
    next_record_id: i64,
    next_detail_id: HashMap<ActionName, i64>,
}

impl Tables {
    fn insert_detail(&mut self, detail: ActionDetail) -> i64 {
        let action = detail.action_name();
        let next = self.next_detail_id.entry(action).or_insert(0);
        *next += 1;
        let id = *next;
        self.details.entry(action).or_default().insert(id, detail);
        id
    }

    fn remove_detail(&mut self, action: ActionName, id: i64) {
        if let Some(table) = self.details.get_mut(&action) {
            table.remove(&id);
        }
    }

    fn insert_record(&mut self, record: NewActionRecord, action_id: i64) -> Result<ActionRecordId> {
        record.validate()?;
        self.next_record_id += 1;
        let id = ActionRecordId::new(self.next_record_id);
        self.records.insert(id.get(), record.into_record(id, action_id));
        Ok(id)
    }
}

/// In-memory implementation of ActionRegisterRepository
///
/// Both tables live under one lock, so a store is atomic with respect to
/// readers; a failed envelope insert removes the detail row it staged.
#[derive(Clone, Default)]
pub struct InMemoryActionRegisterRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryActionRegisterRepository {
    /// Create a new in-memory action register
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of detail rows stored for an action
    pub async fn detail_count(&self, action: ActionName) -> usize {
        let tables = self.tables.read().await;
        tables.details.get(&action).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl ActionRegisterRepository for InMemoryActionRegisterRepository {
    async fn store(
        &self,
        provider: &str,
        action: &Action,
        response: &ActionResponse,
    ) -> Result<ActionRecordId> {
        let detail = ActionDetail::from_attempt(action, response);
        let record = NewActionRecord::from_attempt(provider, action, response);

        let mut tables = self.tables.write().await;

        let action_id = tables.insert_detail(detail);
        match tables.insert_record(record, action_id) {
            Ok(id) => Ok(id),
            Err(e) => {
                tables.remove_detail(action.name(), action_id);
                Err(e)
            }
        }
    }

    async fn get(&self, id: ActionRecordId) -> Result<Option<ActionRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.records.get(&id.get()).cloned())
    }

    async fn get_detail(&self, action: ActionName, action_id: i64) -> Result<Option<ActionDetail>> {
        let tables = self.tables.read().await;
        Ok(tables
            .details
            .get(&action)
            .and_then(|table| table.get(&action_id))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<ActionRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.records.values().cloned().collect())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ActionRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn contexts_for_user(&self, user_id: UserId) -> Result<Vec<ContextId>> {
        let tables = self.tables.read().await;
        let contexts: BTreeSet<ContextId> = tables
            .records
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.context_id)
            .collect();
        Ok(contexts.into_iter().collect())
    }

    async fn users_in_context(&self, context_id: ContextId) -> Result<Vec<UserId>> {
        let tables = self.tables.read().await;
        let users: BTreeSet<UserId> = tables
            .records
            .values()
            .filter(|r| r.context_id == context_id)
            .map(|r| r.user_id)
            .collect();
        Ok(users.into_iter().collect())
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64> {
        let mut tables = self.tables.write().await;

        let doomed: Vec<(i64, ActionName, i64)> = tables
            .records
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| (r.id.get(), r.action_name, r.action_id))
            .collect();

        for (id, action, action_id) in &doomed {
            tables.remove_detail(*action, *action_id);
            tables.records.remove(id);
        }

        Ok(doomed.len() as u64)
    }
}
