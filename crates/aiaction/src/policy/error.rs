use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub type Result<T> = std::result::Result<T, PolicyError>;
