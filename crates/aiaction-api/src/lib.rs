use aiaction::AiApp;
use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub app: AiApp,
    pub cors: CorsConfig,
    pub enable_swagger: bool,
}

impl AppState {
    /// Create a new AppState with the default CORS policy
    pub fn new(app: AiApp) -> Self {
        Self {
            app,
            cors: CorsConfig::default(),
            enable_swagger: true,
        }
    }

    /// Replace the CORS policy
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    /// Serve the Swagger UI or not
    pub fn with_swagger(mut self, enable_swagger: bool) -> Self {
        self.enable_swagger = enable_swagger;
        self
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::v1::actions::list_actions,
        crate::routes::v1::actions::get_action,
        crate::routes::v1::actions::process_action,
        crate::routes::v1::providers::list_providers,
        crate::routes::v1::providers::set_plugin_state,
        crate::routes::v1::providers::set_action_state,
        crate::routes::v1::policy::get_policy,
        crate::routes::v1::policy::accept_policy,
        crate::routes::v1::privacy::get_metadata,
        crate::routes::v1::privacy::contexts_for_user,
        crate::routes::v1::privacy::users_in_context,
        crate::routes::v1::privacy::delete_user_data,
    ),
    components(
        schemas(
            crate::routes::health::HealthResponse,
            crate::routes::v1::actions::ActionInfoDto,
            crate::routes::v1::actions::ProcessActionRequest,
            crate::routes::v1::actions::ActionResponseDto,
            crate::routes::v1::actions::TextResponseDto,
            crate::routes::v1::actions::ImageResponseDto,
            crate::routes::v1::providers::ProviderDto,
            crate::routes::v1::providers::ProviderActionDto,
            crate::routes::v1::providers::SetStateRequest,
            crate::routes::v1::providers::StateChangeResponse,
            crate::routes::v1::policy::PolicyStatusResponse,
            crate::routes::v1::policy::AcceptPolicyRequest,
            crate::routes::v1::privacy::DataTableDto,
            crate::routes::v1::privacy::DataFieldDto,
            crate::routes::v1::privacy::ContextsResponse,
            crate::routes::v1::privacy::UsersResponse,
            crate::routes::v1::privacy::DeleteResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "actions", description = "Action catalogue and dispatch"),
        (name = "providers", description = "Provider and action enable state"),
        (name = "policy", description = "AI usage policy acceptance"),
        (name = "privacy", description = "User data export and erasure")
    )
)]
pub struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allow_any_origin {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build API application
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors);
    let mut router = Router::new().merge(routes::routes());
    if state.enable_swagger {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }
    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
