//! AI usage policy acceptance
//!
//! Acceptances are append-only facts. Reads go through a cache keyed by user
//! id that falls back to the fact table on a miss.

pub mod cache;
pub mod error;
pub mod in_memory_repository;
pub mod model;
pub mod postgres_repository;
pub mod repository;
pub mod service;

pub use cache::{InMemoryPolicyCache, PolicyCache};
pub use error::{PolicyError, Result};
pub use in_memory_repository::InMemoryPolicyRepository;
pub use model::PolicyAcceptance;
pub use postgres_repository::PostgresPolicyRepository;
pub use repository::PolicyRepository;
pub use service::PolicyService;
