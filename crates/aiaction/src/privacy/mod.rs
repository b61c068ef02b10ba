//! User data export and erasure across the action and policy registers

pub mod error;
pub mod service;

pub use error::{PrivacyError, Result};
pub use service::{DataField, DataTable, PrivacyService};
