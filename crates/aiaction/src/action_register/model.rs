use aiaction_core::{
    Action, ActionName, ActionRecordId, ActionResponse, AspectRatio, ContextId, ImageQuality,
    ImageStyle, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActionRegisterError, Result};

/// Maximum length of the `provider` column
pub const MAX_PROVIDER_LENGTH: usize = 255;

/// Maximum length of the `error_message` column
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 255;

/// Cut a message down to what the `error_message` column holds
pub fn truncate_error_message(message: &str) -> String {
    message.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect()
}

/// Detail row of a text producing action
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextDetail {
    pub prompt: String,
    pub response_id: Option<String>,
    pub fingerprint: Option<String>,
    pub generated_content: Option<String>,
    pub finish_reason: Option<String>,
    pub prompt_tokens: Option<i64>,
    pub completion_tokens: Option<i64>,
}

/// Detail row of an image generating action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDetail {
    pub prompt: String,
    pub number_images: i32,
    pub quality: ImageQuality,
    pub aspect_ratio: AspectRatio,
    pub style: ImageStyle,
    pub source_url: Option<String>,
    pub revised_prompt: Option<String>,
}

/// Operation-specific detail row, one table per action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionDetail {
    GenerateText(TextDetail),
    GenerateImage(ImageDetail),
    SummariseText(TextDetail),
}

impl ActionDetail {
    /// Build the detail row for one attempt
    pub fn from_attempt(action: &Action, response: &ActionResponse) -> Self {
        let text = || {
            let payload = response.payload.as_text().cloned().unwrap_or_default();
            TextDetail {
                prompt: action.prompt_text().to_string(),
                response_id: payload.id,
                fingerprint: payload.fingerprint,
                generated_content: payload.generated_content,
                finish_reason: payload.finish_reason,
                prompt_tokens: payload.prompt_tokens,
                completion_tokens: payload.completion_tokens,
            }
        };

        match action {
            Action::GenerateText(_) => ActionDetail::GenerateText(text()),
            Action::SummariseText(_) => ActionDetail::SummariseText(text()),
            Action::GenerateImage(image) => {
                let payload = response.payload.as_image().cloned().unwrap_or_default();
                ActionDetail::GenerateImage(ImageDetail {
                    prompt: image.prompt_text().to_string(),
                    number_images: image.num_images() as i32,
                    quality: image.quality(),
                    aspect_ratio: image.aspect_ratio(),
                    style: image.style(),
                    source_url: payload.source_url,
                    revised_prompt: payload.revised_prompt,
                })
            }
        }
    }

    pub fn action_name(&self) -> ActionName {
        match self {
            ActionDetail::GenerateText(_) => ActionName::GenerateText,
            ActionDetail::GenerateImage(_) => ActionName::GenerateImage,
            ActionDetail::SummariseText(_) => ActionName::SummariseText,
        }
    }

    /// Table holding this detail row
    pub fn table_name(&self) -> String {
        table_name(self.action_name())
    }
}

/// Detail table of an action, always `ai_action_<action name>`
pub fn table_name(action: ActionName) -> String {
    format!("ai_action_{}", action)
}

/// Envelope row before insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActionRecord {
    pub action_name: ActionName,
    pub success: bool,
    pub user_id: UserId,
    pub context_id: ContextId,
    pub provider: String,
    pub error_code: i64,
    pub error_message: String,
    pub time_created: DateTime<Utc>,
    pub time_completed: DateTime<Utc>,
}

impl NewActionRecord {
    /// Build the envelope for one provider attempt
    pub fn from_attempt(provider: &str, action: &Action, response: &ActionResponse) -> Self {
        Self {
            action_name: action.name(),
            success: response.success,
            user_id: action.user_id(),
            context_id: action.context_id(),
            provider: provider.to_string(),
            error_code: response.error_code,
            error_message: response.error_message.clone(),
            time_created: action.time_created(),
            time_completed: response.time_created,
        }
    }

    /// Check the column constraints of the envelope table
    pub fn validate(&self) -> Result<()> {
        if self.provider.is_empty() {
            return Err(ActionRegisterError::ConstraintViolation(
                "provider must not be empty".to_string(),
            ));
        }
        if self.provider.chars().count() > MAX_PROVIDER_LENGTH {
            return Err(ActionRegisterError::ConstraintViolation(format!(
                "provider exceeds {} characters",
                MAX_PROVIDER_LENGTH
            )));
        }
        if self.error_message.chars().count() > MAX_ERROR_MESSAGE_LENGTH {
            return Err(ActionRegisterError::ConstraintViolation(format!(
                "error_message exceeds {} characters",
                MAX_ERROR_MESSAGE_LENGTH
            )));
        }
        Ok(())
    }

    /// Attach row ids
    pub fn into_record(self, id: ActionRecordId, action_id: i64) -> ActionRecord {
        ActionRecord {
            id,
            action_name: self.action_name,
            action_id,
            success: self.success,
            user_id: self.user_id,
            context_id: self.context_id,
            provider: self.provider,
            error_code: self.error_code,
            error_message: self.error_message,
            time_created: self.time_created,
            time_completed: self.time_completed,
        }
    }
}

/// Persisted envelope row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: ActionRecordId,
    pub action_name: ActionName,
    /// Id of the row in the action's detail table
    pub action_id: i64,
    pub success: bool,
    pub user_id: UserId,
    pub context_id: ContextId,
    pub provider: String,
    pub error_code: i64,
    pub error_message: String,
    pub time_created: DateTime<Utc>,
    pub time_completed: DateTime<Utc>,
}
