use aiaction::AiConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host address
    pub host: String,

    /// Port number
    pub port: u16,

    /// CORS configuration
    pub cors: CorsConfig,

    /// Log level
    pub log_level: String,

    /// Enable Swagger UI
    pub enable_swagger: bool,

    /// AI subsystem configuration
    pub ai: AiConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors: CorsConfig::default(),
            log_level: "info".to_string(),
            enable_swagger: true,
            ai: AiConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Convert to SocketAddr
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid address {}: {}", addr, e))
    }

    /// Default tracing filter for the server and the AI subsystem
    pub fn log_filter(&self) -> String {
        format!(
            "aiaction_api={level},aiaction={level},tower_http=debug",
            level = self.log_level
        )
    }

    /// Load from configuration file
    pub fn load_from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins
    pub allowed_origins: Vec<String>,

    /// Allow any origin
    pub allow_any_origin: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            allow_any_origin: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiaction::ProviderErrorPolicy;

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 3000);

        let invalid = ApiConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(invalid.socket_addr().is_err());
    }

    #[test]
    fn test_nested_ai_config() {
        let config: ApiConfig = serde_json::from_str(
            r#"{ "port": 8080, "ai": { "provider_error_policy": "propagate" } }"#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.enable_swagger);
        assert_eq!(config.ai.provider_error_policy, ProviderErrorPolicy::Propagate);
    }

    #[test]
    fn test_log_filter_uses_configured_level() {
        let config: ApiConfig = serde_json::from_str(r#"{ "log_level": "debug" }"#).unwrap();

        assert_eq!(
            config.log_filter(),
            "aiaction_api=debug,aiaction=debug,tower_http=debug"
        );
        assert_eq!(
            ApiConfig::default().log_filter(),
            "aiaction_api=info,aiaction=info,tower_http=debug"
        );
    }
}
