use aiaction::{ContextId, UserId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{ApiResult, AppState};

/// Whether a user accepted the AI usage policy
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PolicyStatusResponse {
    pub user_id: i64,
    pub accepted: bool,
}

/// Request to record a policy acceptance
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AcceptPolicyRequest {
    pub user_id: i64,
    pub context_id: i64,
}

/// Get a user's policy status
#[utoipa::path(
    get,
    path = "/api/v1/policy/{user_id}",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Policy status", body = PolicyStatusResponse)
    ),
    tag = "policy"
)]
pub async fn get_policy(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<PolicyStatusResponse>> {
    let accepted = state.app.policy().get_policy(UserId::new(user_id)).await?;
    Ok(Json(PolicyStatusResponse { user_id, accepted }))
}

/// Record that a user accepted the policy
#[utoipa::path(
    post,
    path = "/api/v1/policy",
    request_body = AcceptPolicyRequest,
    responses(
        (status = 201, description = "Acceptance recorded", body = PolicyStatusResponse)
    ),
    tag = "policy"
)]
pub async fn accept_policy(
    State(state): State<AppState>,
    Json(request): Json<AcceptPolicyRequest>,
) -> ApiResult<(StatusCode, Json<PolicyStatusResponse>)> {
    let accepted = state
        .app
        .policy()
        .set_policy(
            UserId::new(request.user_id),
            ContextId::new(request.context_id),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PolicyStatusResponse {
            user_id: request.user_id,
            accepted,
        }),
    ))
}

pub fn routes() -> axum::Router<AppState> {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", post(accept_policy))
        .route("/{user_id}", get(get_policy))
}
