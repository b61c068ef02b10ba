use aiaction::ActionName;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{ApiError, ApiResult, AppState};

/// Enable state of one provider action
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProviderActionDto {
    pub action: String,
    pub enabled: bool,
}

/// API representation of a registered provider
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProviderDto {
    pub name: String,
    pub enabled: bool,
    pub actions: Vec<ProviderActionDto>,
}

/// Request to change an enable flag
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetStateRequest {
    pub enabled: bool,
}

/// Result of an enable flag change
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StateChangeResponse {
    pub plugin: String,
    pub action: Option<String>,
    pub enabled: bool,
    /// False when the flag already had the requested value
    pub changed: bool,
}

fn resolve_plugin(state: &AppState, plugin: &str) -> ApiResult<()> {
    state
        .app
        .registry()
        .resolve(plugin)
        .map(|_| ())
        .map_err(|e| ApiError::NotFound(e.to_string()))
}

/// List providers in dispatch order
#[utoipa::path(
    get,
    path = "/api/v1/providers",
    responses(
        (status = 200, description = "Registered providers", body = Vec<ProviderDto>)
    ),
    tag = "providers"
)]
pub async fn list_providers(State(state): State<AppState>) -> ApiResult<Json<Vec<ProviderDto>>> {
    let registry = state.app.registry();
    let mut providers = Vec::with_capacity(registry.providers().len());

    for provider in registry.providers() {
        let name = provider.name();
        let mut actions = Vec::new();
        for action in registry.supported_actions(name)? {
            actions.push(ProviderActionDto {
                action: action.to_string(),
                enabled: registry.is_action_enabled(name, action).await?,
            });
        }
        providers.push(ProviderDto {
            name: name.to_string(),
            enabled: registry.is_plugin_enabled(name).await?,
            actions,
        });
    }

    Ok(Json(providers))
}

/// Enable or disable a plugin
#[utoipa::path(
    put,
    path = "/api/v1/providers/{plugin}",
    params(
        ("plugin" = String, Path, description = "Plugin name, e.g. aiprovider_openai")
    ),
    request_body = SetStateRequest,
    responses(
        (status = 200, description = "State applied", body = StateChangeResponse),
        (status = 404, description = "Unknown plugin")
    ),
    tag = "providers"
)]
pub async fn set_plugin_state(
    State(state): State<AppState>,
    Path(plugin): Path<String>,
    Json(request): Json<SetStateRequest>,
) -> ApiResult<Json<StateChangeResponse>> {
    resolve_plugin(&state, &plugin)?;
    let changed = state
        .app
        .registry()
        .enable_plugin(&plugin, request.enabled)
        .await?;

    Ok(Json(StateChangeResponse {
        plugin,
        action: None,
        enabled: request.enabled,
        changed,
    }))
}

/// Enable or disable one action of a provider
#[utoipa::path(
    put,
    path = "/api/v1/providers/{plugin}/actions/{action}",
    params(
        ("plugin" = String, Path, description = "Provider name, e.g. aiprovider_openai"),
        ("action" = String, Path, description = "Action name, e.g. summarise_text")
    ),
    request_body = SetStateRequest,
    responses(
        (status = 200, description = "State applied", body = StateChangeResponse),
        (status = 400, description = "The plugin is not a provider or does not support the action"),
        (status = 404, description = "Unknown plugin or action")
    ),
    tag = "providers"
)]
pub async fn set_action_state(
    State(state): State<AppState>,
    Path((plugin, action)): Path<(String, String)>,
    Json(request): Json<SetStateRequest>,
) -> ApiResult<Json<StateChangeResponse>> {
    let action = ActionName::parse(&action)?;
    resolve_plugin(&state, &plugin)?;
    let changed = state
        .app
        .registry()
        .set_provider_action_state(&plugin, action, request.enabled)
        .await?;

    Ok(Json(StateChangeResponse {
        plugin,
        action: Some(action.to_string()),
        enabled: request.enabled,
        changed,
    }))
}

pub fn routes() -> axum::Router<AppState> {
    use axum::routing::{get, put};

    axum::Router::new()
        .route("/", get(list_providers))
        .route("/{plugin}", put(set_plugin_state))
        .route("/{plugin}/actions/{action}", put(set_action_state))
}
