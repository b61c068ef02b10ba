//! # aiaction
//!
//! Pluggable AI action dispatch. Providers are registered explicitly, the
//! dispatcher tries them in registration order and every attempt lands in
//! the action register. Policy acceptance and privacy operations sit on the
//! same stores.

pub mod action_register;
pub mod app;
pub mod config;
pub mod error;
pub mod manager;
pub mod plugin_config;
pub mod policy;
pub mod privacy;
pub mod providers;
pub mod registry;

// Re-export core types
pub use aiaction_core::{
    Action, ActionName, ActionRecordId, ActionResponse, AspectRatio, ContextId, CoreError,
    GenerateImage, GenerateText, ImageQuality, ImageResponse, ImageStyle, NO_PROVIDERS_ERROR_CODE,
    NO_PROVIDERS_ERROR_MESSAGE, Placement, Provider, ResponsePayload, SharedPlacement,
    SharedProvider, SummariseText, TextResponse, UserId,
};

pub use app::{AiApp, AiAppBuilder, connect_database};
pub use config::AiConfig;
pub use error::{AiError, Result as AiResult};
pub use manager::{ActionInfo, AiManager, ManagerConfig, ProviderErrorPolicy};
pub use policy::PolicyService;
pub use privacy::PrivacyService;
pub use registry::ProviderRegistry;
