//! Action register: one envelope row per dispatch attempt plus the
//! operation-specific detail row it points to.

pub mod error;
pub mod in_memory_repository;
pub mod model;
pub mod postgres_repository;
pub mod repository;

pub use error::{ActionRegisterError, Result};
pub use in_memory_repository::InMemoryActionRegisterRepository;
pub use model::{
    ActionDetail, ActionRecord, ImageDetail, MAX_ERROR_MESSAGE_LENGTH, MAX_PROVIDER_LENGTH,
    NewActionRecord, TextDetail, truncate_error_message,
};
pub use postgres_repository::PostgresActionRegisterRepository;
pub use repository::ActionRegisterRepository;
