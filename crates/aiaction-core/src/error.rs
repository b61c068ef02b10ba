//! Error types for aiaction-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Action {action} is not supported by {provider}")]
    UnsupportedAction { provider: String, action: String },

    #[error("Provider error: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
