pub mod error;
pub mod registry;

pub use error::{RegistryError, Result};
pub use registry::{PLACEMENT_PREFIX, PROVIDER_PREFIX, PluginHandle, PluginKind, ProviderRegistry};
