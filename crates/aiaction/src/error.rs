//! Error types for aiaction crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Core error: {0}")]
    Core(#[from] aiaction_core::CoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    #[error("Manager error: {0}")]
    Manager(#[from] crate::manager::ManagerError),

    #[error("Action register error: {0}")]
    ActionRegister(#[from] crate::action_register::ActionRegisterError),

    #[error("Policy error: {0}")]
    Policy(#[from] crate::policy::PolicyError),

    #[error("Privacy error: {0}")]
    Privacy(#[from] crate::privacy::PrivacyError),

    #[error("Database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, AiError>;
