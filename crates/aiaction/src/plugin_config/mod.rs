//! Per-plugin configuration flags
//!
//! A flat `(plugin, name) -> value` store. The registry keeps plugin and
//! per-action enable state here.

pub mod error;
pub mod in_memory_repository;
pub mod postgres_repository;
pub mod repository;

pub use error::{PluginConfigError, Result};
pub use in_memory_repository::InMemoryPluginConfigRepository;
pub use postgres_repository::PostgresPluginConfigRepository;
pub use repository::PluginConfigRepository;
