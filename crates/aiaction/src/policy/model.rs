use aiaction_core::{ContextId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's acceptance of the AI usage policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAcceptance {
    pub id: i64,
    pub user_id: UserId,
    /// Context the policy was accepted in
    pub context_id: ContextId,
    pub time_accepted: DateTime<Utc>,
}
