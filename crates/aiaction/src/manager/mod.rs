//! Action dispatch
//!
//! The manager hands a configured action to each enabled provider in
//! registration order, records every attempt in the action register and
//! stops at the first success.

pub mod error;
pub mod service;

pub use error::{ManagerError, Result};
pub use service::{
    ActionInfo, AiManager, ManagerConfig, PROVIDER_ERROR_CODE, PROVIDER_TIMEOUT_ERROR_CODE,
    ProviderErrorPolicy,
};
