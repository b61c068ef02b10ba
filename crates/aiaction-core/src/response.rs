//! Response types for aiaction-core

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::ActionName;

/// Error code returned when no provider is available for an action
pub const NO_PROVIDERS_ERROR_CODE: i64 = -1;

/// Error message returned when no provider is available for an action
pub const NO_PROVIDERS_ERROR_MESSAGE: &str = "No providers available to process the action.";

/// Payload of a text generating action
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextResponse {
    /// Provider side id of the response
    pub id: Option<String>,
    /// Hash of the model/content state
    pub fingerprint: Option<String>,
    pub generated_content: Option<String>,
    pub finish_reason: Option<String>,
    pub prompt_tokens: Option<i64>,
    pub completion_tokens: Option<i64>,
}

/// Payload of an image generating action
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageResponse {
    pub revised_prompt: Option<String>,
    pub source_url: Option<String>,
}

/// Operation specific payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    #[default]
    None,
    Text(TextResponse),
    Image(ImageResponse),
}

impl ResponsePayload {
    /// The text payload, if any
    pub fn as_text(&self) -> Option<&TextResponse> {
        match self {
            ResponsePayload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The image payload, if any
    pub fn as_image(&self) -> Option<&ImageResponse> {
        match self {
            ResponsePayload::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Outcome of one provider attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub action_name: ActionName,
    /// Zero on success
    pub error_code: i64,
    pub error_message: String,
    /// When the response was produced
    pub time_created: DateTime<Utc>,
    pub payload: ResponsePayload,
}

impl ActionResponse {
    /// Create a successful response
    pub fn success(action_name: ActionName, payload: ResponsePayload) -> Self {
        Self {
            success: true,
            action_name,
            error_code: 0,
            error_message: String::new(),
            time_created: Utc::now().trunc_subsecs(0),
            payload,
        }
    }

    /// Create a failed response
    pub fn failure(action_name: ActionName, error_code: i64, error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            action_name,
            error_code,
            error_message: error_message.into(),
            time_created: Utc::now().trunc_subsecs(0),
            payload: ResponsePayload::None,
        }
    }

    /// Create the response returned when no provider can process an action
    pub fn no_providers(action_name: ActionName) -> Self {
        Self::failure(action_name, NO_PROVIDERS_ERROR_CODE, NO_PROVIDERS_ERROR_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_providers_response() {
        let response = ActionResponse::no_providers(ActionName::SummariseText);
        assert!(!response.success);
        assert_eq!(response.error_code, -1);
        assert_eq!(
            response.error_message,
            "No providers available to process the action."
        );
        assert_eq!(response.payload, ResponsePayload::None);
    }

    #[test]
    fn test_success_response_carries_payload() {
        let payload = ResponsePayload::Text(TextResponse {
            generated_content: Some("summary".to_string()),
            prompt_tokens: Some(12),
            ..Default::default()
        });
        let response = ActionResponse::success(ActionName::SummariseText, payload);

        assert!(response.success);
        assert_eq!(response.error_code, 0);
        assert_eq!(
            response.payload.as_text().unwrap().generated_content.as_deref(),
            Some("summary")
        );
        assert!(response.payload.as_image().is_none());
    }
}
