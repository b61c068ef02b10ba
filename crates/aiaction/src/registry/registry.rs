//! Provider and placement registry
//!
//! Plugins are registered explicitly at startup and validated at that point:
//! the name must carry the `aiprovider_`/`aiplacement_` prefix, be unique, and
//! declare each supported action once.
//!
//! Registration order is the dispatch priority. `providers_for_actions`
//! returns providers in the order they were registered and the dispatcher
//! tries them in that order.

use aiaction_core::{ActionName, SharedPlacement, SharedProvider};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use super::{RegistryError, Result};
use crate::plugin_config::PluginConfigRepository;

/// Name prefix of provider plugins
pub const PROVIDER_PREFIX: &str = "aiprovider_";

/// Name prefix of placement plugins
pub const PLACEMENT_PREFIX: &str = "aiplacement_";

const DISABLED_FLAG: &str = "disabled";

/// Kind of AI plugin, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Provider,
    Placement,
}

impl PluginKind {
    /// Classify a plugin name by its prefix
    pub fn from_plugin_name(name: &str) -> Result<Self> {
        if name.starts_with(PROVIDER_PREFIX) {
            Ok(PluginKind::Provider)
        } else if name.starts_with(PLACEMENT_PREFIX) {
            Ok(PluginKind::Placement)
        } else {
            Err(RegistryError::Configuration(format!(
                "Plugin name does not start with '{}' or '{}': {}",
                PROVIDER_PREFIX, PLACEMENT_PREFIX, name
            )))
        }
    }
}

/// A registered plugin
#[derive(Clone)]
pub enum PluginHandle {
    Provider(SharedProvider),
    Placement(SharedPlacement),
}

impl PluginHandle {
    pub fn name(&self) -> &str {
        match self {
            PluginHandle::Provider(p) => p.name(),
            PluginHandle::Placement(p) => p.name(),
        }
    }

    pub fn kind(&self) -> PluginKind {
        match self {
            PluginHandle::Provider(_) => PluginKind::Provider,
            PluginHandle::Placement(_) => PluginKind::Placement,
        }
    }

    pub fn supported_actions(&self) -> Vec<ActionName> {
        match self {
            PluginHandle::Provider(p) => p.supported_actions(),
            PluginHandle::Placement(p) => p.supported_actions(),
        }
    }
}

/// Registry of installed AI plugins and their enable state
pub struct ProviderRegistry {
    providers: Vec<SharedProvider>,
    placements: Vec<SharedPlacement>,
    config: Arc<dyn PluginConfigRepository>,
}

impl ProviderRegistry {
    /// Create an empty registry backed by a plugin config store
    pub fn new(config: Arc<dyn PluginConfigRepository>) -> Self {
        Self {
            providers: Vec::new(),
            placements: Vec::new(),
            config,
        }
    }

    /// Register a provider plugin
    pub fn register_provider(&mut self, provider: SharedProvider) -> Result<()> {
        self.validate(provider.name(), PluginKind::Provider, &provider.supported_actions())?;
        info!(provider = provider.name(), "Registered AI provider");
        self.providers.push(provider);
        Ok(())
    }

    /// Register a placement plugin
    pub fn register_placement(&mut self, placement: SharedPlacement) -> Result<()> {
        self.validate(
            placement.name(),
            PluginKind::Placement,
            &placement.supported_actions(),
        )?;
        info!(placement = placement.name(), "Registered AI placement");
        self.placements.push(placement);
        Ok(())
    }

    fn validate(&self, name: &str, expected: PluginKind, actions: &[ActionName]) -> Result<()> {
        let kind = PluginKind::from_plugin_name(name)?;
        if kind != expected {
            return Err(RegistryError::Configuration(format!(
                "Plugin {} is registered as the wrong kind",
                name
            )));
        }

        let prefix = match kind {
            PluginKind::Provider => PROVIDER_PREFIX,
            PluginKind::Placement => PLACEMENT_PREFIX,
        };
        if name.len() == prefix.len() {
            return Err(RegistryError::Configuration(format!(
                "Plugin name has no component after the prefix: {}",
                name
            )));
        }

        if self.find(name).is_some() {
            return Err(RegistryError::Configuration(format!(
                "Plugin already registered: {}",
                name
            )));
        }

        let mut seen = HashSet::new();
        for action in actions {
            if !seen.insert(action) {
                return Err(RegistryError::Configuration(format!(
                    "Plugin {} declares action {} more than once",
                    name, action
                )));
            }
        }

        Ok(())
    }

    fn find(&self, name: &str) -> Option<PluginHandle> {
        self.providers
            .iter()
            .find(|p| p.name() == name)
            .map(|p| PluginHandle::Provider(p.clone()))
            .or_else(|| {
                self.placements
                    .iter()
                    .find(|p| p.name() == name)
                    .map(|p| PluginHandle::Placement(p.clone()))
            })
    }

    /// Resolve a plugin by name
    pub fn resolve(&self, plugin_name: &str) -> Result<PluginHandle> {
        PluginKind::from_plugin_name(plugin_name)?;
        self.find(plugin_name).ok_or_else(|| {
            RegistryError::Configuration(format!("Plugin not installed: {}", plugin_name))
        })
    }

    /// Actions a plugin declares, in declaration order
    pub fn supported_actions(&self, plugin_name: &str) -> Result<Vec<ActionName>> {
        Ok(self.resolve(plugin_name)?.supported_actions())
    }

    /// All registered providers, in registration order
    pub fn providers(&self) -> &[SharedProvider] {
        &self.providers
    }

    /// All registered placements, in registration order
    pub fn placements(&self) -> &[SharedPlacement] {
        &self.placements
    }

    /// For each requested action, the providers declaring support for it
    ///
    /// The result follows the order of `actions`; each provider list follows
    /// registration order. With `enabled_only`, providers that are disabled
    /// or have the action disabled are skipped.
    pub async fn providers_for_actions(
        &self,
        actions: &[ActionName],
        enabled_only: bool,
    ) -> Result<Vec<(ActionName, Vec<SharedProvider>)>> {
        let mut result = Vec::with_capacity(actions.len());

        for action in actions {
            let mut candidates = Vec::new();
            for provider in &self.providers {
                if !provider.supported_actions().contains(action) {
                    continue;
                }
                if enabled_only
                    && !(self.is_plugin_enabled(provider.name()).await?
                        && self.is_action_enabled(provider.name(), *action).await?)
                {
                    continue;
                }
                candidates.push(provider.clone());
            }
            result.push((*action, candidates));
        }

        Ok(result)
    }

    /// Whether a plugin is enabled; plugins are enabled unless disabled explicitly
    pub async fn is_plugin_enabled(&self, plugin_name: &str) -> Result<bool> {
        let value = self.config.get(plugin_name, DISABLED_FLAG).await?;
        Ok(!is_truthy(value.as_deref()))
    }

    /// Enable or disable a plugin, returning whether the stored state changed
    pub async fn enable_plugin(&self, plugin_name: &str, enabled: bool) -> Result<bool> {
        self.resolve(plugin_name)?;
        let changed = self.toggle(plugin_name, DISABLED_FLAG, enabled).await?;
        if changed {
            info!(plugin = plugin_name, enabled, "Plugin state changed");
        }
        Ok(changed)
    }

    /// Whether an action is enabled for a plugin; actions are enabled by default
    pub async fn is_action_enabled(&self, plugin_name: &str, action: ActionName) -> Result<bool> {
        let value = self.config.get(plugin_name, &action_flag(action)).await?;
        Ok(!is_truthy(value.as_deref()))
    }

    /// Enable or disable one action of a provider, returning whether the stored state changed
    pub async fn set_provider_action_state(
        &self,
        plugin_name: &str,
        action: ActionName,
        enabled: bool,
    ) -> Result<bool> {
        let handle = self.resolve(plugin_name)?;
        if handle.kind() != PluginKind::Provider {
            return Err(RegistryError::Configuration(format!(
                "Action state can only be set on providers: {}",
                plugin_name
            )));
        }
        if !handle.supported_actions().contains(&action) {
            return Err(RegistryError::Configuration(format!(
                "Provider {} does not support action {}",
                plugin_name, action
            )));
        }

        let changed = self.toggle(plugin_name, &action_flag(action), enabled).await?;
        if changed {
            info!(
                plugin = plugin_name,
                action = %action,
                enabled,
                "Provider action state changed"
            );
        }
        Ok(changed)
    }

    async fn toggle(&self, plugin_name: &str, flag: &str, enabled: bool) -> Result<bool> {
        let old_value = self.config.get(plugin_name, flag).await?;
        let currently_disabled = is_truthy(old_value.as_deref());

        if !currently_disabled && !enabled {
            self.config.set(plugin_name, flag, "1").await?;
            Ok(true)
        } else if currently_disabled && enabled {
            self.config.unset(plugin_name, flag).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn action_flag(action: ActionName) -> String {
    format!("{}_{}", action, DISABLED_FLAG)
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty() && v != "0")
}
