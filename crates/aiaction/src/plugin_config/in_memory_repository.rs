use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{PluginConfigError, PluginConfigRepository, Result};

/// In-memory implementation of PluginConfigRepository
#[derive(Clone, Default)]
pub struct InMemoryPluginConfigRepository {
    values: Arc<RwLock<HashMap<(String, String), String>>>,
}

impl InMemoryPluginConfigRepository {
    /// Create a new in-memory config repository
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(plugin: &str, name: &str) -> Result<(String, String)> {
    if plugin.is_empty() || name.is_empty() {
        return Err(PluginConfigError::InvalidKey(format!("{}/{}", plugin, name)));
    }
    Ok((plugin.to_string(), name.to_string()))
}

#[async_trait]
impl PluginConfigRepository for InMemoryPluginConfigRepository {
    async fn get(&self, plugin: &str, name: &str) -> Result<Option<String>> {
        let key = key(plugin, name)?;
        let values = self.values.read().await;
        Ok(values.get(&key).cloned())
    }

    async fn set(&self, plugin: &str, name: &str, value: &str) -> Result<()> {
        let key = key(plugin, name)?;
        let mut values = self.values.write().await;
        values.insert(key, value.to_string());
        Ok(())
    }

    async fn unset(&self, plugin: &str, name: &str) -> Result<bool> {
        let key = key(plugin, name)?;
        let mut values = self.values.write().await;
        Ok(values.remove(&key).is_some())
    }
}
