use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionRegisterError {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid record data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub type Result<T> = std::result::Result<T, ActionRegisterError>;
