//! Provider and placement traits for aiaction-core
//!
//! A provider processes actions against an AI service. Each action kind has
//! its own typed handler; a provider overrides the handlers for the actions it
//! lists in `supported_actions` and leaves the rest at their default, which
//! reports the action as unsupported.
//!
//! Providers report an unsuccessful attempt through a failed
//! [`ActionResponse`]. An `Err` means the provider could not produce a
//! response at all (transport failure, bug); what the dispatcher does with it
//! is the caller's policy.

use crate::{
    Action, ActionName, ActionResponse, CoreError, GenerateImage, GenerateText, Result,
    SummariseText,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for AI providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Plugin name, e.g. `aiprovider_openai`
    fn name(&self) -> &str;

    /// Actions this provider can process, in declaration order
    fn supported_actions(&self) -> Vec<ActionName>;

    async fn process_generate_text(&self, _action: &GenerateText) -> Result<ActionResponse> {
        Err(self.unsupported(ActionName::GenerateText))
    }

    async fn process_generate_image(&self, _action: &GenerateImage) -> Result<ActionResponse> {
        Err(self.unsupported(ActionName::GenerateImage))
    }

    async fn process_summarise_text(&self, _action: &SummariseText) -> Result<ActionResponse> {
        Err(self.unsupported(ActionName::SummariseText))
    }

    /// Route an action to its typed handler
    async fn process(&self, action: &Action) -> Result<ActionResponse> {
        match action {
            Action::GenerateText(a) => self.process_generate_text(a).await,
            Action::GenerateImage(a) => self.process_generate_image(a).await,
            Action::SummariseText(a) => self.process_summarise_text(a).await,
        }
    }

    #[doc(hidden)]
    fn unsupported(&self, action: ActionName) -> CoreError {
        CoreError::UnsupportedAction {
            provider: self.name().to_string(),
            action: action.to_string(),
        }
    }
}

/// Arc-wrapped provider for thread-safe sharing
pub type SharedProvider = Arc<dyn Provider>;

/// A placement surfaces actions to users; it only declares which ones
pub trait Placement: Send + Sync {
    /// Plugin name, e.g. `aiplacement_editor`
    fn name(&self) -> &str;

    /// Actions this placement uses, in declaration order
    fn supported_actions(&self) -> Vec<ActionName>;
}

/// Arc-wrapped placement for thread-safe sharing
pub type SharedPlacement = Arc<dyn Placement>;
