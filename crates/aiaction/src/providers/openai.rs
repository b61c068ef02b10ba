//! OpenAI-compatible provider
//!
//! Text actions go to the chat completions endpoint, image generation to the
//! images endpoint. An HTTP error status is a failed response carrying the
//! status code; a request that never got a response is an `Err`.

use aiaction_core::{
    ActionName, ActionResponse, AspectRatio, CoreError, GenerateImage, GenerateText,
    ImageResponse, Provider, ResponsePayload, Result, SummariseText, TextResponse, UserId,
};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::action_register::truncate_error_message;

/// Plugin name of the OpenAI provider
pub const OPENAI_PROVIDER_NAME: &str = "aiprovider_openai";

/// Error code of a well-formed reply that carries no result
pub const EMPTY_RESPONSE_ERROR_CODE: i64 = 502;

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,

    /// API root, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    pub text_model: String,

    pub image_model: String,

    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            text_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Provider backed by an OpenAI-compatible HTTP API
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create a new OpenAiProvider
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CoreError::InvalidConfiguration(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| CoreError::InvalidConfiguration(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// POST a JSON body, returning the decoded body or a failed response
    async fn post<B, R>(
        &self,
        action: ActionName,
        path: &str,
        body: &B,
    ) -> Result<std::result::Result<R, ActionResponse>>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let url = self.endpoint(path);
        debug!(url = %url, action = %action, "Sending request to OpenAI");

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| CoreError::Provider(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Ok(Err(ActionResponse::failure(
                action,
                i64::from(status.as_u16()),
                truncate_error_message(&message),
            )));
        }

        let decoded = response
            .json::<R>()
            .await
            .map_err(|e| CoreError::Provider(format!("Invalid response from {}: {}", url, e)))?;
        Ok(Ok(decoded))
    }

    async fn complete(
        &self,
        action: ActionName,
        user_id: UserId,
        prompt: &str,
    ) -> Result<ActionResponse> {
        let mut messages = Vec::with_capacity(2);
        let instruction = action.system_instruction();
        if !instruction.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: instruction,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let body = ChatRequest {
            model: &self.config.text_model,
            messages,
            user: user_id.to_string(),
        };

        let completion: ChatResponse = match self.post(action, "chat/completions", &body).await? {
            Ok(completion) => completion,
            Err(failure) => return Ok(failure),
        };

        let choice = completion.choices.into_iter().next();
        Ok(ActionResponse::success(
            action,
            ResponsePayload::Text(TextResponse {
                id: completion.id,
                fingerprint: completion.system_fingerprint,
                generated_content: choice.as_ref().and_then(|c| c.message.content.clone()),
                finish_reason: choice.and_then(|c| c.finish_reason),
                prompt_tokens: completion.usage.as_ref().map(|u| u.prompt_tokens),
                completion_tokens: completion.usage.map(|u| u.completion_tokens),
            }),
        ))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        OPENAI_PROVIDER_NAME
    }

    fn supported_actions(&self) -> Vec<ActionName> {
        vec![
            ActionName::GenerateText,
            ActionName::GenerateImage,
            ActionName::SummariseText,
        ]
    }

    async fn process_generate_text(&self, action: &GenerateText) -> Result<ActionResponse> {
        self.complete(ActionName::GenerateText, action.user_id(), action.prompt_text())
            .await
    }

    async fn process_summarise_text(&self, action: &SummariseText) -> Result<ActionResponse> {
        self.complete(ActionName::SummariseText, action.user_id(), action.prompt_text())
            .await
    }

    async fn process_generate_image(&self, action: &GenerateImage) -> Result<ActionResponse> {
        let body = ImageRequest {
            model: &self.config.image_model,
            prompt: action.prompt_text(),
            n: action.num_images(),
            quality: action.quality().to_string(),
            size: image_size(action.aspect_ratio()),
            style: action.style().to_string(),
            response_format: "url",
            user: action.user_id().to_string(),
        };

        let images: ImagesResponse = match self
            .post(ActionName::GenerateImage, "images/generations", &body)
            .await?
        {
            Ok(images) => images,
            Err(failure) => return Ok(failure),
        };

        let Some(image) = images.data.into_iter().next() else {
            return Ok(ActionResponse::failure(
                ActionName::GenerateImage,
                EMPTY_RESPONSE_ERROR_CODE,
                "Image generation returned no images",
            ));
        };
        Ok(ActionResponse::success(
            ActionName::GenerateImage,
            ResponsePayload::Image(ImageResponse {
                revised_prompt: image.revised_prompt,
                source_url: image.url,
            }),
        ))
    }
}

/// Pixel size for an aspect ratio
fn image_size(ratio: AspectRatio) -> &'static str {
    match ratio {
        AspectRatio::Square => "1024x1024",
        AspectRatio::Landscape => "1792x1024",
        AspectRatio::Portrait => "1024x1792",
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    user: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    id: Option<String>,
    system_fingerprint: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: i64,
    completion_tokens: i64,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    quality: String,
    size: &'static str,
    style: String,
    response_format: &'static str,
    user: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiaction_core::{ContextId, ImageQuality, ImageStyle};
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn chat(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
        captured.lock().await.push(body);
        Json(json!({
            "id": "chatcmpl-123",
            "system_fingerprint": "fp_abc",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "A short summary." },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
        }))
    }

    async fn images(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
        captured.lock().await.push(body);
        Json(json!({
            "created": 1700000000,
            "data": [{
                "url": "https://example.com/image.png",
                "revised_prompt": "A fluffy cat"
            }]
        }))
    }

    async fn no_images() -> Json<Value> {
        Json(json!({ "created": 1700000000, "data": [] }))
    }

    async fn rate_limited() -> (StatusCode, Json<Value>) {
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "message": "Rate limit reached", "type": "requests" } })),
        )
    }

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    async fn create_provider() -> (OpenAiProvider, Captured) {
        let captured = Captured::default();
        let router = Router::new()
            .route("/v1/chat/completions", post(chat))
            .route("/v1/images/generations", post(images))
            .with_state(captured.clone());
        let base_url = spawn_server(router).await;
        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            base_url,
            ..Default::default()
        })
        .unwrap();
        (provider, captured)
    }

    #[tokio::test]
    async fn test_summarise_sends_system_instruction() {
        let (provider, captured) = create_provider().await;
        let action = SummariseText::configure(ContextId::new(1), UserId::new(7), "Long text");

        let response = provider.process_summarise_text(&action).await.unwrap();

        assert!(response.success);
        let text = response.payload.as_text().unwrap();
        assert_eq!(text.id.as_deref(), Some("chatcmpl-123"));
        assert_eq!(text.fingerprint.as_deref(), Some("fp_abc"));
        assert_eq!(text.generated_content.as_deref(), Some("A short summary."));
        assert_eq!(text.finish_reason.as_deref(), Some("stop"));
        assert_eq!(text.prompt_tokens, Some(12));
        assert_eq!(text.completion_tokens, Some(4));

        let requests = captured.lock().await;
        let messages = requests[0]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(
            messages[0]["content"],
            ActionName::SummariseText.system_instruction()
        );
        assert_eq!(messages[1]["content"], "Long text");
        assert_eq!(requests[0]["user"], "7");
    }

    #[tokio::test]
    async fn test_generate_text_has_no_system_message() {
        let (provider, captured) = create_provider().await;
        let action = GenerateText::configure(ContextId::new(1), UserId::new(1), "Hello");

        let response = provider.process_generate_text(&action).await.unwrap();

        assert!(response.success);
        let requests = captured.lock().await;
        let messages = requests[0]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(requests[0]["model"], "gpt-4o");
    }

    #[tokio::test]
    async fn test_generate_image() {
        let (provider, captured) = create_provider().await;
        let action = GenerateImage::configure(
            ContextId::new(1),
            UserId::new(1),
            "a cat",
            ImageQuality::Hd,
            AspectRatio::Landscape,
            1,
            ImageStyle::Natural,
        )
        .unwrap();

        let response = provider.process_generate_image(&action).await.unwrap();

        assert!(response.success);
        let image = response.payload.as_image().unwrap();
        assert_eq!(
            image.source_url.as_deref(),
            Some("https://example.com/image.png")
        );
        assert_eq!(image.revised_prompt.as_deref(), Some("A fluffy cat"));

        let requests = captured.lock().await;
        assert_eq!(requests[0]["size"], "1792x1024");
        assert_eq!(requests[0]["quality"], "hd");
        assert_eq!(requests[0]["style"], "natural");
        assert_eq!(requests[0]["n"], 1);
    }

    #[tokio::test]
    async fn test_http_error_is_failed_response() {
        let router = Router::new().route("/v1/chat/completions", post(rate_limited));
        let base_url = spawn_server(router).await;
        let provider = OpenAiProvider::new(OpenAiConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();
        let action = GenerateText::configure(ContextId::new(1), UserId::new(1), "Hello");

        let response = provider.process_generate_text(&action).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error_code, 429);
        assert_eq!(response.error_message, "Rate limit reached");
    }

    #[tokio::test]
    async fn test_empty_image_list_is_failed_response() {
        let router = Router::new().route("/v1/images/generations", post(no_images));
        let base_url = spawn_server(router).await;
        let provider = OpenAiProvider::new(OpenAiConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();
        let action = GenerateImage::configure(
            ContextId::new(1),
            UserId::new(1),
            "a cat",
            ImageQuality::Standard,
            AspectRatio::Square,
            1,
            ImageStyle::Vivid,
        )
        .unwrap();

        let response = provider.process_generate_image(&action).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error_code, EMPTY_RESPONSE_ERROR_CODE);
        assert!(response.payload.as_image().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = OpenAiProvider::new(OpenAiConfig {
            base_url: format!("http://{}/v1", addr),
            ..Default::default()
        })
        .unwrap();
        let action = GenerateText::configure(ContextId::new(1), UserId::new(1), "Hello");

        let result = provider.process_generate_text(&action).await;
        assert!(matches!(result, Err(CoreError::Provider(_))));
    }

    #[test]
    fn test_image_size() {
        assert_eq!(image_size(AspectRatio::Square), "1024x1024");
        assert_eq!(image_size(AspectRatio::Portrait), "1024x1792");
    }
}
