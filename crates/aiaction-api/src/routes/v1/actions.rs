use aiaction::{
    Action, ActionInfo, ActionName, ActionResponse, AspectRatio, ContextId, GenerateImage,
    GenerateText, ImageQuality, ImageResponse, ImageStyle, ResponsePayload, SummariseText,
    TextResponse, UserId,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::{ApiError, ApiResult, AppState};

/// Catalogue entry for an action kind
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ActionInfoDto {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

impl From<ActionInfo> for ActionInfoDto {
    fn from(info: ActionInfo) -> Self {
        Self {
            name: info.name.to_string(),
            display_name: info.display_name,
            description: info.description,
        }
    }
}

/// Request to process an action
///
/// The image fields are only read for `generate_image`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessActionRequest {
    pub context_id: i64,
    pub user_id: i64,
    pub prompt_text: String,
    /// `standard` (default) or `hd`
    pub quality: Option<String>,
    /// `square` (default), `landscape` or `portrait`
    pub aspect_ratio: Option<String>,
    /// Defaults to 1
    pub num_images: Option<u32>,
    /// `vivid` (default) or `natural`
    pub style: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TextResponseDto {
    pub id: Option<String>,
    pub fingerprint: Option<String>,
    pub generated_content: Option<String>,
    pub finish_reason: Option<String>,
    pub prompt_tokens: Option<i64>,
    pub completion_tokens: Option<i64>,
}

impl From<TextResponse> for TextResponseDto {
    fn from(text: TextResponse) -> Self {
        Self {
            id: text.id,
            fingerprint: text.fingerprint,
            generated_content: text.generated_content,
            finish_reason: text.finish_reason,
            prompt_tokens: text.prompt_tokens,
            completion_tokens: text.completion_tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageResponseDto {
    pub revised_prompt: Option<String>,
    pub source_url: Option<String>,
}

impl From<ImageResponse> for ImageResponseDto {
    fn from(image: ImageResponse) -> Self {
        Self {
            revised_prompt: image.revised_prompt,
            source_url: image.source_url,
        }
    }
}

/// API representation of an action response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionResponseDto {
    pub success: bool,
    pub action_name: String,
    pub error_code: i64,
    pub error_message: String,
    pub time_created: String,
    pub text: Option<TextResponseDto>,
    pub image: Option<ImageResponseDto>,
}

impl From<ActionResponse> for ActionResponseDto {
    fn from(response: ActionResponse) -> Self {
        let (text, image) = match response.payload {
            ResponsePayload::None => (None, None),
            ResponsePayload::Text(text) => (Some(text.into()), None),
            ResponsePayload::Image(image) => (None, Some(image.into())),
        };

        Self {
            success: response.success,
            action_name: response.action_name.to_string(),
            error_code: response.error_code,
            error_message: response.error_message,
            time_created: response.time_created.to_rfc3339(),
            text,
            image,
        }
    }
}

fn parse_field<T: FromStr>(value: Option<&str>, field: &str, default: T) -> ApiResult<T> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", field, value))),
    }
}

fn configure(name: ActionName, request: ProcessActionRequest) -> ApiResult<Action> {
    let context_id = ContextId::new(request.context_id);
    let user_id = UserId::new(request.user_id);

    let action = match name {
        ActionName::GenerateText => {
            GenerateText::configure(context_id, user_id, request.prompt_text).into()
        }
        ActionName::SummariseText => {
            SummariseText::configure(context_id, user_id, request.prompt_text).into()
        }
        ActionName::GenerateImage => GenerateImage::configure(
            context_id,
            user_id,
            request.prompt_text,
            parse_field(request.quality.as_deref(), "quality", ImageQuality::Standard)?,
            parse_field(
                request.aspect_ratio.as_deref(),
                "aspect_ratio",
                AspectRatio::Square,
            )?,
            request.num_images.unwrap_or(1),
            parse_field(request.style.as_deref(), "style", ImageStyle::Vivid)?,
        )?
        .into(),
    };
    Ok(action)
}

/// List the known actions
#[utoipa::path(
    get,
    path = "/api/v1/actions",
    responses(
        (status = 200, description = "Action catalogue", body = Vec<ActionInfoDto>)
    ),
    tag = "actions"
)]
pub async fn list_actions(State(state): State<AppState>) -> Json<Vec<ActionInfoDto>> {
    Json(
        state
            .app
            .manager()
            .action_catalogue()
            .into_iter()
            .map(ActionInfoDto::from)
            .collect(),
    )
}

/// Get one action
#[utoipa::path(
    get,
    path = "/api/v1/actions/{action}",
    params(
        ("action" = String, Path, description = "Action name, e.g. summarise_text")
    ),
    responses(
        (status = 200, description = "Action details", body = ActionInfoDto),
        (status = 404, description = "Unknown action")
    ),
    tag = "actions"
)]
pub async fn get_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> ApiResult<Json<ActionInfoDto>> {
    let info = state.app.manager().get_action(&action)?;
    Ok(Json(info.into()))
}

/// Configure an action and dispatch it to the enabled providers
///
/// Provider failures are reported in the response body with status 200.
#[utoipa::path(
    post,
    path = "/api/v1/actions/{action}",
    params(
        ("action" = String, Path, description = "Action name, e.g. summarise_text")
    ),
    request_body = ProcessActionRequest,
    responses(
        (status = 200, description = "Dispatch result", body = ActionResponseDto),
        (status = 400, description = "Invalid action configuration"),
        (status = 404, description = "Unknown action"),
        (status = 500, description = "The attempt could not be recorded")
    ),
    tag = "actions"
)]
pub async fn process_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Json(request): Json<ProcessActionRequest>,
) -> ApiResult<Json<ActionResponseDto>> {
    let name = ActionName::parse(&action)?;
    let action = configure(name, request)?;
    let response = state.app.manager().process_action(action).await?;
    Ok(Json(response.into()))
}

pub fn routes() -> axum::Router<AppState> {
    use axum::routing::get;

    axum::Router::new()
        .route("/", get(list_actions))
        .route("/{action}", get(get_action).post(process_action))
}
