//! Application layer for aiaction
//!
//! `AiApp` owns every store and service a request needs: the provider
//! registry, the dispatcher, the policy tracker and the privacy operations.
//! It is built once and shared by reference.

use aiaction_core::{SharedPlacement, SharedProvider};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tracing::info;

use crate::action_register::{
    ActionRegisterRepository, InMemoryActionRegisterRepository, PostgresActionRegisterRepository,
};
use crate::config::AiConfig;
use crate::error::{AiError, Result};
use crate::manager::AiManager;
use crate::plugin_config::{
    InMemoryPluginConfigRepository, PluginConfigRepository, PostgresPluginConfigRepository,
};
use crate::policy::{
    InMemoryPolicyCache, InMemoryPolicyRepository, PolicyCache, PolicyRepository, PolicyService,
    PostgresPolicyRepository,
};
use crate::privacy::PrivacyService;
use crate::providers::OpenAiProvider;
use crate::registry::ProviderRegistry;

/// The assembled AI subsystem
#[derive(Clone)]
pub struct AiApp {
    manager: AiManager,
    policy: PolicyService,
    privacy: PrivacyService,
    config: AiConfig,
}

impl AiApp {
    /// Create a new builder
    pub fn builder() -> AiAppBuilder {
        AiAppBuilder::new()
    }

    pub fn manager(&self) -> &AiManager {
        &self.manager
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        self.manager.registry()
    }

    pub fn policy(&self) -> &PolicyService {
        &self.policy
    }

    pub fn privacy(&self) -> &PrivacyService {
        &self.privacy
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }
}

/// Builder for AiApp
///
/// Stores that are not set explicitly default to their in-memory versions.
#[derive(Default)]
pub struct AiAppBuilder {
    config: AiConfig,
    providers: Vec<SharedProvider>,
    placements: Vec<SharedPlacement>,
    plugin_config: Option<Arc<dyn PluginConfigRepository>>,
    action_register: Option<Arc<dyn ActionRegisterRepository>>,
    policy_repository: Option<Arc<dyn PolicyRepository>>,
    policy_cache: Option<Arc<dyn PolicyCache>>,
}

impl AiAppBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration
    pub fn config(mut self, config: AiConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a provider; providers are tried in the order they are added
    pub fn provider(mut self, provider: SharedProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Register a placement
    pub fn placement(mut self, placement: SharedPlacement) -> Self {
        self.placements.push(placement);
        self
    }

    pub fn plugin_config(mut self, repository: Arc<dyn PluginConfigRepository>) -> Self {
        self.plugin_config = Some(repository);
        self
    }

    pub fn action_register(mut self, repository: Arc<dyn ActionRegisterRepository>) -> Self {
        self.action_register = Some(repository);
        self
    }

    pub fn policy_repository(mut self, repository: Arc<dyn PolicyRepository>) -> Self {
        self.policy_repository = Some(repository);
        self
    }

    pub fn policy_cache(mut self, cache: Arc<dyn PolicyCache>) -> Self {
        self.policy_cache = Some(cache);
        self
    }

    /// Use PostgreSQL for every persistent store
    pub fn postgres(self, pool: PgPool) -> Self {
        self.plugin_config(Arc::new(PostgresPluginConfigRepository::new(pool.clone())))
            .action_register(Arc::new(PostgresActionRegisterRepository::new(pool.clone())))
            .policy_repository(Arc::new(PostgresPolicyRepository::new(pool)))
    }

    /// Connect to `database_url` when configured, run migrations and use PostgreSQL
    pub async fn connect(self) -> Result<Self> {
        let Some(database_url) = self.config.database_url.clone() else {
            return Ok(self);
        };

        let pool = connect_database(&database_url).await?;
        Ok(self.postgres(pool))
    }

    /// Build the application
    pub fn build(self) -> Result<AiApp> {
        let plugin_config = self
            .plugin_config
            .unwrap_or_else(|| Arc::new(InMemoryPluginConfigRepository::new()));
        let action_register = self
            .action_register
            .unwrap_or_else(|| Arc::new(InMemoryActionRegisterRepository::new()));
        let policy_repository = self
            .policy_repository
            .unwrap_or_else(|| Arc::new(InMemoryPolicyRepository::new()));
        let policy_cache = self.policy_cache.unwrap_or_else(|| {
            Arc::new(InMemoryPolicyCache::with_settings(
                self.config.policy_cache_max_capacity,
                self.config.policy_cache_ttl(),
            ))
        });

        let mut registry = ProviderRegistry::new(plugin_config);
        if let Some(openai) = &self.config.openai {
            registry.register_provider(Arc::new(OpenAiProvider::new(openai.clone())?))?;
        }
        for provider in self.providers {
            registry.register_provider(provider)?;
        }
        for placement in self.placements {
            registry.register_placement(placement)?;
        }
        info!(
            providers = registry.providers().len(),
            placements = registry.placements().len(),
            "AI registry ready"
        );

        let manager = AiManager::new(Arc::new(registry), action_register.clone())
            .with_config(self.config.manager_config());
        let policy = PolicyService::new(policy_repository, policy_cache);
        let privacy = PrivacyService::new(action_register, policy.clone());

        Ok(AiApp {
            manager,
            policy,
            privacy,
            config: self.config,
        })
    }
}

/// Open a connection pool and bring the schema up to date
pub async fn connect_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| AiError::Database(format!("Failed to connect: {}", e)))?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| AiError::Database(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiaction_core::{
        ActionName, ActionResponse, ContextId, Placement, Provider, ResponsePayload,
        SummariseText, TextResponse, UserId,
    };
    use async_trait::async_trait;

    struct StaticProvider;

    #[async_trait]
    impl Provider for StaticProvider {
        fn name(&self) -> &str {
            "aiprovider_static"
        }

        fn supported_actions(&self) -> Vec<ActionName> {
            vec![ActionName::SummariseText]
        }

        async fn process_summarise_text(
            &self,
            _action: &SummariseText,
        ) -> aiaction_core::Result<ActionResponse> {
            Ok(ActionResponse::success(
                ActionName::SummariseText,
                ResponsePayload::Text(TextResponse {
                    generated_content: Some("summary".to_string()),
                    ..Default::default()
                }),
            ))
        }
    }

    struct EditorPlacement;

    impl Placement for EditorPlacement {
        fn name(&self) -> &str {
            "aiplacement_editor"
        }

        fn supported_actions(&self) -> Vec<ActionName> {
            vec![ActionName::SummariseText]
        }
    }

    #[tokio::test]
    async fn test_builder_wires_services() {
        let app = AiApp::builder()
            .provider(Arc::new(StaticProvider))
            .placement(Arc::new(EditorPlacement))
            .build()
            .unwrap();

        assert_eq!(app.registry().providers().len(), 1);
        assert_eq!(app.registry().placements().len(), 1);

        let action = SummariseText::configure(ContextId::new(2), UserId::new(5), "text");
        let response = app.manager().process_action(action).await.unwrap();
        assert!(response.success);

        app.policy()
            .set_policy(UserId::new(5), ContextId::new(3))
            .await
            .unwrap();
        assert_eq!(
            app.privacy().contexts_for_user(UserId::new(5)).await.unwrap(),
            vec![ContextId::new(2), ContextId::new(3)]
        );
    }

    #[tokio::test]
    async fn test_openai_config_registers_provider() {
        let config = AiConfig {
            openai: Some(Default::default()),
            ..Default::default()
        };

        let app = AiApp::builder().config(config).build().unwrap();
        assert!(app.registry().resolve("aiprovider_openai").is_ok());
    }

    #[test]
    fn test_duplicate_provider_is_rejected() {
        let result = AiApp::builder()
            .provider(Arc::new(StaticProvider))
            .provider(Arc::new(StaticProvider))
            .build();

        assert!(matches!(result, Err(AiError::Registry(_))));
    }
}
