use thiserror::Error;

use crate::plugin_config::PluginConfigError;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Plugin config error: {0}")]
    PluginConfig(#[from] PluginConfigError),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
