use aiaction_core::{Action, ActionName, ActionResponse, CoreError, Provider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumString};
use tracing::{debug, info, warn};

use super::{ManagerError, Result};
use crate::action_register::{ActionRegisterRepository, truncate_error_message};
use crate::registry::ProviderRegistry;

/// Error code recorded when a provider returns an error instead of a response
pub const PROVIDER_ERROR_CODE: i64 = 500;

/// Error code recorded when a provider exceeds the configured timeout
pub const PROVIDER_TIMEOUT_ERROR_CODE: i64 = 408;

/// What the dispatcher does when a provider returns `Err`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderErrorPolicy {
    /// Record the error as a failed attempt and try the next provider
    #[default]
    Continue,
    /// Abort the dispatch without recording the attempt
    Propagate,
}

/// Dispatcher settings
#[derive(Debug, Clone, Default)]
pub struct ManagerConfig {
    pub provider_error_policy: ProviderErrorPolicy,
    /// Upper bound for a single provider call
    pub provider_timeout: Option<Duration>,
}

/// Catalogue entry for an action kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub name: ActionName,
    pub display_name: String,
    pub description: String,
}

impl From<ActionName> for ActionInfo {
    fn from(name: ActionName) -> Self {
        Self {
            name,
            display_name: name.display_name().to_string(),
            description: name.description().to_string(),
        }
    }
}

/// Dispatches actions to providers and records every attempt
#[derive(Clone)]
pub struct AiManager {
    registry: Arc<ProviderRegistry>,
    register: Arc<dyn ActionRegisterRepository>,
    config: ManagerConfig,
}

impl AiManager {
    /// Create a new AiManager with the default configuration
    pub fn new(
        registry: Arc<ProviderRegistry>,
        register: Arc<dyn ActionRegisterRepository>,
    ) -> Self {
        Self {
            registry,
            register,
            config: ManagerConfig::default(),
        }
    }

    /// Replace the dispatcher configuration
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn register(&self) -> &Arc<dyn ActionRegisterRepository> {
        &self.register
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// All known action kinds
    pub fn action_catalogue(&self) -> Vec<ActionInfo> {
        ActionName::iter().map(ActionInfo::from).collect()
    }

    /// Look up one action kind by name
    pub fn get_action(&self, name: &str) -> Result<ActionInfo> {
        Ok(ActionName::parse(name)?.into())
    }

    /// Process an action with the enabled providers
    ///
    /// Providers are tried in registration order and every attempt is stored
    /// before the next one starts. Returns the first successful response, the
    /// last failed one when all providers fail, or the no-providers response
    /// when none is enabled. A storage error aborts the dispatch.
    pub async fn process_action(&self, action: impl Into<Action>) -> Result<ActionResponse> {
        let action = action.into();
        let name = action.name();

        let providers = self
            .registry
            .providers_for_actions(&[name], true)
            .await?
            .into_iter()
            .next()
            .map(|(_, providers)| providers)
            .unwrap_or_default();

        if providers.is_empty() {
            info!(action = %name, "No providers available");
            return Ok(ActionResponse::no_providers(name));
        }

        let mut last_failure = None;
        for provider in providers {
            debug!(provider = provider.name(), action = %name, "Dispatching action");

            let response = match self.call_provider(provider.as_ref(), &action).await {
                Ok(response) => response,
                Err(source) => match self.config.provider_error_policy {
                    ProviderErrorPolicy::Propagate => {
                        return Err(ManagerError::Provider {
                            provider: provider.name().to_string(),
                            source,
                        });
                    }
                    ProviderErrorPolicy::Continue => ActionResponse::failure(
                        name,
                        PROVIDER_ERROR_CODE,
                        truncate_error_message(&source.to_string()),
                    ),
                },
            };

            let record_id = self
                .register
                .store(provider.name(), &action, &response)
                .await?;

            if response.success {
                info!(
                    provider = provider.name(),
                    action = %name,
                    record = %record_id,
                    "Action processed"
                );
                return Ok(response);
            }

            warn!(
                provider = provider.name(),
                action = %name,
                error_code = response.error_code,
                "Provider failed: {}",
                response.error_message
            );
            last_failure = Some(response);
        }

        Ok(last_failure.unwrap_or_else(|| ActionResponse::no_providers(name)))
    }

    async fn call_provider(
        &self,
        provider: &dyn Provider,
        action: &Action,
    ) -> std::result::Result<ActionResponse, CoreError> {
        let Some(limit) = self.config.provider_timeout else {
            return provider.process(action).await;
        };

        match tokio::time::timeout(limit, provider.process(action)).await {
            Ok(result) => result,
            Err(_) => Ok(ActionResponse::failure(
                action.name(),
                PROVIDER_TIMEOUT_ERROR_CODE,
                format!("Provider timed out after {:?}", limit),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_register::InMemoryActionRegisterRepository;
    use crate::plugin_config::InMemoryPluginConfigRepository;
    use aiaction_core::{
        ContextId, NO_PROVIDERS_ERROR_CODE, NO_PROVIDERS_ERROR_MESSAGE, ResponsePayload,
        SummariseText, TextResponse, UserId,
    };
    use async_trait::async_trait;

    enum Outcome {
        Succeed,
        Fail(i64, String),
        Error,
        Hang,
    }

    struct ScriptedProvider {
        name: &'static str,
        outcome: Outcome,
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn supported_actions(&self) -> Vec<ActionName> {
            vec![ActionName::SummariseText]
        }

        async fn process_summarise_text(
            &self,
            action: &SummariseText,
        ) -> aiaction_core::Result<ActionResponse> {
            match &self.outcome {
                Outcome::Succeed => Ok(ActionResponse::success(
                    ActionName::SummariseText,
                    ResponsePayload::Text(TextResponse {
                        generated_content: Some(format!("{} says {}", self.name, action.prompt_text())),
                        ..Default::default()
                    }),
                )),
                Outcome::Fail(code, message) => Ok(ActionResponse::failure(
                    ActionName::SummariseText,
                    *code,
                    message.clone(),
                )),
                Outcome::Error => Err(CoreError::Provider("connection reset".to_string())),
                Outcome::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(CoreError::Provider("unreachable".to_string()))
                }
            }
        }
    }

    fn scripted(name: &'static str, outcome: Outcome) -> Arc<dyn Provider> {
        Arc::new(ScriptedProvider { name, outcome })
    }

    fn create_manager(
        providers: Vec<Arc<dyn Provider>>,
    ) -> (AiManager, InMemoryActionRegisterRepository) {
        let mut registry = ProviderRegistry::new(Arc::new(InMemoryPluginConfigRepository::new()));
        for provider in providers {
            registry.register_provider(provider).unwrap();
        }
        let register = InMemoryActionRegisterRepository::new();
        let manager = AiManager::new(Arc::new(registry), Arc::new(register.clone()));
        (manager, register)
    }

    fn summarise() -> SummariseText {
        SummariseText::configure(ContextId::new(1), UserId::new(1), "hi")
    }

    #[tokio::test]
    async fn test_falls_back_to_next_provider() {
        let (manager, register) = create_manager(vec![
            scripted("aiprovider_p1", Outcome::Fail(7, "quota exceeded".to_string())),
            scripted("aiprovider_p2", Outcome::Succeed),
        ]);

        let response = manager.process_action(summarise()).await.unwrap();

        assert!(response.success);
        assert_eq!(
            response.payload.as_text().unwrap().generated_content.as_deref(),
            Some("aiprovider_p2 says hi")
        );

        let records = register.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(!records[0].success);
        assert_eq!(records[0].error_code, 7);
        assert_eq!(records[0].provider, "aiprovider_p1");
        assert!(records[1].success);
        assert_eq!(records[1].provider, "aiprovider_p2");
        assert_eq!(register.detail_count(ActionName::SummariseText).await, 2);
    }

    #[tokio::test]
    async fn test_first_success_stops_dispatch() {
        let (manager, register) = create_manager(vec![
            scripted("aiprovider_p1", Outcome::Succeed),
            scripted("aiprovider_p2", Outcome::Succeed),
        ]);

        let response = manager.process_action(summarise()).await.unwrap();

        assert!(response.success);
        let records = register.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].provider, "aiprovider_p1");
        assert_eq!(register.detail_count(ActionName::SummariseText).await, 1);
    }

    #[tokio::test]
    async fn test_all_providers_fail_returns_last_failure() {
        let (manager, register) = create_manager(vec![
            scripted("aiprovider_p1", Outcome::Fail(7, "first".to_string())),
            scripted("aiprovider_p2", Outcome::Fail(9, "second".to_string())),
        ]);

        let response = manager.process_action(summarise()).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error_code, 9);
        assert_eq!(response.error_message, "second");
        assert_eq!(register.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_no_providers() {
        let (manager, register) = create_manager(vec![]);

        let response = manager.process_action(summarise()).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error_code, NO_PROVIDERS_ERROR_CODE);
        assert_eq!(response.error_message, NO_PROVIDERS_ERROR_MESSAGE);
        assert!(register.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_providers_are_skipped() {
        let (manager, register) = create_manager(vec![
            scripted("aiprovider_p1", Outcome::Succeed),
            scripted("aiprovider_p2", Outcome::Succeed),
        ]);
        manager
            .registry()
            .enable_plugin("aiprovider_p1", false)
            .await
            .unwrap();

        manager.process_action(summarise()).await.unwrap();

        let records = register.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].provider, "aiprovider_p2");

        manager
            .registry()
            .set_provider_action_state("aiprovider_p2", ActionName::SummariseText, false)
            .await
            .unwrap();
        let response = manager.process_action(summarise()).await.unwrap();
        assert_eq!(response.error_code, NO_PROVIDERS_ERROR_CODE);
    }

    #[tokio::test]
    async fn test_provider_error_continues_by_default() {
        let (manager, register) = create_manager(vec![
            scripted("aiprovider_p1", Outcome::Error),
            scripted("aiprovider_p2", Outcome::Succeed),
        ]);

        let response = manager.process_action(summarise()).await.unwrap();

        assert!(response.success);
        let records = register.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].error_code, PROVIDER_ERROR_CODE);
        assert!(records[0].error_message.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates_when_configured() {
        let (manager, register) = create_manager(vec![
            scripted("aiprovider_p1", Outcome::Error),
            scripted("aiprovider_p2", Outcome::Succeed),
        ]);
        let manager = manager.with_config(ManagerConfig {
            provider_error_policy: ProviderErrorPolicy::Propagate,
            ..Default::default()
        });

        let result = manager.process_action(summarise()).await;

        assert!(matches!(
            result,
            Err(ManagerError::Provider { ref provider, .. }) if provider == "aiprovider_p1"
        ));
        assert!(register.list().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_provider_is_a_failed_attempt() {
        let (manager, register) = create_manager(vec![
            scripted("aiprovider_slow", Outcome::Hang),
            scripted("aiprovider_p2", Outcome::Succeed),
        ]);
        let manager = manager.with_config(ManagerConfig {
            provider_timeout: Some(Duration::from_millis(250)),
            ..Default::default()
        });

        let response = manager.process_action(summarise()).await.unwrap();

        assert!(response.success);
        let records = register.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].provider, "aiprovider_slow");
        assert_eq!(records[0].error_code, PROVIDER_TIMEOUT_ERROR_CODE);
        assert_eq!(records[0].error_message, "Provider timed out after 250ms");
    }

    #[tokio::test]
    async fn test_persistence_failure_aborts_dispatch() {
        let (manager, register) = create_manager(vec![
            scripted("aiprovider_p1", Outcome::Fail(7, "x".repeat(300))),
            scripted("aiprovider_p2", Outcome::Succeed),
        ]);

        let result = manager.process_action(summarise()).await;

        assert!(matches!(result, Err(ManagerError::Persistence(_))));
        assert!(register.list().await.unwrap().is_empty());
        assert_eq!(register.detail_count(ActionName::SummariseText).await, 0);
    }

    #[tokio::test]
    async fn test_action_catalogue() {
        let (manager, _) = create_manager(vec![]);

        let catalogue = manager.action_catalogue();
        assert_eq!(catalogue.len(), 3);
        assert_eq!(catalogue[0].name, ActionName::GenerateText);

        let info = manager.get_action("summarise_text").unwrap();
        assert_eq!(info.display_name, "Summarise text");
        assert!(matches!(
            manager.get_action("translate_text"),
            Err(ManagerError::InvalidAction(CoreError::UnknownAction(_)))
        ));
    }
}
