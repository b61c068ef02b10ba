use super::Result;
use async_trait::async_trait;

/// Repository trait for plugin configuration flags
#[async_trait]
pub trait PluginConfigRepository: Send + Sync {
    /// Get a config value
    async fn get(&self, plugin: &str, name: &str) -> Result<Option<String>>;

    /// Set a config value, replacing any previous one
    async fn set(&self, plugin: &str, name: &str, value: &str) -> Result<()>;

    /// Remove a config value, returning whether it existed
    async fn unset(&self, plugin: &str, name: &str) -> Result<bool>;
}
