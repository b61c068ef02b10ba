use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::manager::{ManagerConfig, ProviderErrorPolicy};
use crate::providers::OpenAiConfig;

/// aiaction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// What to do when a provider returns an error instead of a response
    pub provider_error_policy: ProviderErrorPolicy,

    /// Upper bound for a single provider call, unbounded when unset
    pub provider_timeout_secs: Option<u64>,

    /// Lifetime of policy cache entries, unbounded when unset
    pub policy_cache_ttl_secs: Option<u64>,

    /// Most users the policy cache holds at once, unbounded when unset
    pub policy_cache_max_capacity: Option<u64>,

    /// PostgreSQL connection string; in-memory stores are used when unset
    pub database_url: Option<String>,

    /// Registers the OpenAI provider when present
    pub openai: Option<OpenAiConfig>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider_error_policy: ProviderErrorPolicy::default(),
            provider_timeout_secs: None,
            policy_cache_ttl_secs: None,
            policy_cache_max_capacity: None,
            database_url: None,
            openai: None,
        }
    }
}

impl AiConfig {
    /// Load from configuration file
    pub fn load_from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
    }

    /// Dispatcher settings derived from this configuration
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            provider_error_policy: self.provider_error_policy,
            provider_timeout: self.provider_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn policy_cache_ttl(&self) -> Option<Duration> {
        self.policy_cache_ttl_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.provider_error_policy, ProviderErrorPolicy::Continue);
        assert!(config.manager_config().provider_timeout.is_none());
        assert!(config.policy_cache_ttl().is_none());
        assert!(config.openai.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AiConfig = serde_json::from_str(
            r#"{
                "provider_error_policy": "propagate",
                "provider_timeout_secs": 30,
                "openai": { "api_key": "sk-test" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.provider_error_policy, ProviderErrorPolicy::Propagate);
        assert_eq!(
            config.manager_config().provider_timeout,
            Some(Duration::from_secs(30))
        );
        assert!(config.policy_cache_max_capacity.is_none());
        let openai = config.openai.unwrap();
        assert_eq!(openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(openai.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("aiaction-config-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "policy_cache_ttl_secs": 600, "policy_cache_max_capacity": 5000 }"#,
        )
        .unwrap();

        let config = AiConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.policy_cache_ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.policy_cache_max_capacity, Some(5000));
        assert!(AiConfig::load_from_file(&path).is_err());
    }
}
