use aiaction_core::{ActionName, ContextId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::info;

use super::Result;
use crate::action_register::{ActionRegisterRepository, model::table_name};
use crate::policy::PolicyService;

/// A column holding user data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub name: String,
    pub description: String,
}

/// A table holding user data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    pub description: String,
    pub fields: Vec<DataField>,
}

impl DataTable {
    fn new(name: impl Into<String>, description: &str, fields: &[(&str, &str)]) -> Self {
        Self {
            name: name.into(),
            description: description.to_string(),
            fields: fields
                .iter()
                .map(|(name, description)| DataField {
                    name: name.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }
}

/// Service answering user data questions over both registers
#[derive(Clone)]
pub struct PrivacyService {
    register: Arc<dyn ActionRegisterRepository>,
    policy: PolicyService,
}

impl PrivacyService {
    /// Create a new PrivacyService
    pub fn new(register: Arc<dyn ActionRegisterRepository>, policy: PolicyService) -> Self {
        Self { register, policy }
    }

    /// Tables and columns that store user data
    pub fn metadata(&self) -> Vec<DataTable> {
        let mut tables = vec![
            DataTable::new(
                "ai_policy_register",
                "Acceptance of the AI usage policy",
                &[
                    ("user_id", "The user that accepted the policy"),
                    ("context_id", "The context the policy was accepted in"),
                    ("time_accepted", "When the policy was accepted"),
                ],
            ),
            DataTable::new(
                "ai_action_register",
                "One row per attempt to process an AI action",
                &[
                    ("action_name", "The action that was requested"),
                    ("action_id", "The detail row of the request"),
                    ("success", "Whether the provider processed the action"),
                    ("user_id", "The user that requested the action"),
                    ("context_id", "The context the action was requested in"),
                    ("provider", "The provider that processed the action"),
                    ("error_code", "The error code reported by the provider"),
                    ("error_message", "The error message reported by the provider"),
                    ("time_created", "When the action was requested"),
                    ("time_completed", "When the provider responded"),
                ],
            ),
        ];

        for action in ActionName::iter() {
            let table = match action {
                ActionName::GenerateImage => DataTable::new(
                    table_name(action),
                    "Image generation requests and their results",
                    &[
                        ("prompt", "The prompt the user submitted"),
                        ("number_images", "Number of images requested"),
                        ("quality", "Requested image quality"),
                        ("aspect_ratio", "Requested aspect ratio"),
                        ("style", "Requested image style"),
                        ("source_url", "Where the generated image was served from"),
                        ("revised_prompt", "The prompt the provider actually used"),
                    ],
                ),
                _ => DataTable::new(
                    table_name(action),
                    "Text requests and the generated content",
                    &[
                        ("prompt", "The prompt the user submitted"),
                        ("response_id", "The provider's id for the response"),
                        ("fingerprint", "The provider's model fingerprint"),
                        ("generated_content", "The text the provider generated"),
                        ("finish_reason", "Why the provider stopped generating"),
                        ("prompt_tokens", "Tokens used by the prompt"),
                        ("completion_tokens", "Tokens used by the generated content"),
                    ],
                ),
            };
            tables.push(table);
        }

        tables
    }

    /// Contexts holding data of a user, sorted and de-duplicated
    pub async fn contexts_for_user(&self, user_id: UserId) -> Result<Vec<ContextId>> {
        let mut contexts: BTreeSet<ContextId> =
            self.policy.contexts_for_user(user_id).await?.into_iter().collect();
        contexts.extend(self.register.contexts_for_user(user_id).await?);
        Ok(contexts.into_iter().collect())
    }

    /// Users with data in a context, sorted and de-duplicated
    pub async fn users_in_context(&self, context_id: ContextId) -> Result<Vec<UserId>> {
        let mut users: BTreeSet<UserId> =
            self.policy.users_in_context(context_id).await?.into_iter().collect();
        users.extend(self.register.users_in_context(context_id).await?);
        Ok(users.into_iter().collect())
    }

    /// Erase all data of a user, returning the number of register and policy rows removed
    pub async fn delete_data_for_user(&self, user_id: UserId) -> Result<u64> {
        let actions = self.register.delete_for_user(user_id).await?;
        let acceptances = self.policy.delete_for_user(user_id).await?;
        info!(
            user = %user_id,
            actions,
            acceptances,
            "Deleted AI data for user"
        );
        Ok(actions + acceptances)
    }
}
