use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginConfigError {
    #[error("Invalid config key: {0}")]
    InvalidKey(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub type Result<T> = std::result::Result<T, PluginConfigError>;
