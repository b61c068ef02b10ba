use aiaction_core::CoreError;
use thiserror::Error;

use crate::action_register::ActionRegisterError;
use crate::registry::RegistryError;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Invalid action: {0}")]
    InvalidAction(#[from] CoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] ActionRegisterError),

    #[error("Provider {provider} failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: CoreError,
    },
}

pub type Result<T> = std::result::Result<T, ManagerError>;
