//! HTTP error responses

use aiaction::CoreError;
use aiaction::manager::ManagerError;
use aiaction::policy::PolicyError;
use aiaction::privacy::PrivacyError;
use aiaction::registry::RegistryError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            ApiError::Internal(message) => {
                error!("Request failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::UnknownAction(_) => ApiError::NotFound(e.to_string()),
            CoreError::InvalidConfiguration(_) | CoreError::UnsupportedAction { .. } => {
                ApiError::BadRequest(e.to_string())
            }
            CoreError::Provider(_) => ApiError::BadGateway(e.to_string()),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Configuration(_) => ApiError::BadRequest(e.to_string()),
            RegistryError::PluginConfig(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ManagerError> for ApiError {
    fn from(e: ManagerError) -> Self {
        match e {
            ManagerError::InvalidAction(e) => e.into(),
            ManagerError::Registry(e) => e.into(),
            ManagerError::Provider { .. } => ApiError::BadGateway(e.to_string()),
            ManagerError::Persistence(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(e: PolicyError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<PrivacyError> for ApiError {
    fn from(e: PrivacyError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
