//! Action types for aiaction-core
//!
//! An action is one configured request for an AI operation. Each action kind
//! has its own `configure` constructor taking exactly the fields that
//! operation needs, so a half-configured action cannot be dispatched.
//! Actions are immutable once configured.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{ContextId, CoreError, Result, UserId};

/// Name of an action kind, as persisted in the action register
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionName {
    GenerateText,
    GenerateImage,
    SummariseText,
}

impl ActionName {
    /// Parse an action name, failing with `CoreError::UnknownAction`
    pub fn parse(name: &str) -> Result<Self> {
        name.parse::<Self>()
            .map_err(|_| CoreError::UnknownAction(name.to_string()))
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ActionName::GenerateText => "Generate text",
            ActionName::GenerateImage => "Generate image",
            ActionName::SummariseText => "Summarise text",
        }
    }

    /// Short description of what the action does
    pub fn description(&self) -> &'static str {
        match self {
            ActionName::GenerateText => "Generates text based on a text prompt.",
            ActionName::GenerateImage => "Generates an image based on a text prompt.",
            ActionName::SummariseText => "Summarises text based on provided input text.",
        }
    }

    /// System instruction sent along with the prompt, empty when the action has none
    pub fn system_instruction(&self) -> &'static str {
        match self {
            ActionName::SummariseText => SUMMARISE_TEXT_INSTRUCTION,
            _ => "",
        }
    }
}

const SUMMARISE_TEXT_INSTRUCTION: &str = "You will receive a text input from the user. \
Your task is to summarize the provided text. Follow these guidelines:
    1. Condense: Shorten long passages into key points.
    2. Simplify: Make complex information easier to understand, especially for learners.

Important Instructions:
    1. Return the summary in plain text only.
    2. Do not include any markdown formatting, greetings, or platitudes.
    3. Focus on clarity, conciseness, and accessibility.

Ensure the summary is easy to read and effectively conveys the main points of the original text.";

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Generate free text from a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateText {
    context_id: ContextId,
    user_id: UserId,
    prompt_text: String,
    time_created: DateTime<Utc>,
}

impl GenerateText {
    /// Configure the action
    pub fn configure(context_id: ContextId, user_id: UserId, prompt_text: impl Into<String>) -> Self {
        Self {
            context_id,
            user_id,
            prompt_text: prompt_text.into(),
            time_created: now(),
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn time_created(&self) -> DateTime<Utc> {
        self.time_created
    }
}

/// Summarise a block of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummariseText {
    context_id: ContextId,
    user_id: UserId,
    prompt_text: String,
    time_created: DateTime<Utc>,
}

impl SummariseText {
    /// Configure the action
    pub fn configure(context_id: ContextId, user_id: UserId, prompt_text: impl Into<String>) -> Self {
        Self {
            context_id,
            user_id,
            prompt_text: prompt_text.into(),
            time_created: now(),
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn time_created(&self) -> DateTime<Utc> {
        self.time_created
    }
}

/// Image quality requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageQuality {
    Standard,
    Hd,
}

/// Aspect ratio of generated images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AspectRatio {
    Square,
    Landscape,
    Portrait,
}

/// Visual style of generated images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageStyle {
    Natural,
    Vivid,
}

/// Generate one or more images from a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateImage {
    context_id: ContextId,
    user_id: UserId,
    prompt_text: String,
    quality: ImageQuality,
    aspect_ratio: AspectRatio,
    num_images: u32,
    style: ImageStyle,
    time_created: DateTime<Utc>,
}

impl GenerateImage {
    /// Configure the action
    #[allow(clippy::too_many_arguments)]
    pub fn configure(
        context_id: ContextId,
        user_id: UserId,
        prompt_text: impl Into<String>,
        quality: ImageQuality,
        aspect_ratio: AspectRatio,
        num_images: u32,
        style: ImageStyle,
    ) -> Result<Self> {
        if num_images == 0 {
            return Err(CoreError::InvalidConfiguration(
                "num_images must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            context_id,
            user_id,
            prompt_text: prompt_text.into(),
            quality,
            aspect_ratio,
            num_images,
            style,
            time_created: now(),
        })
    }

    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn quality(&self) -> ImageQuality {
        self.quality
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn num_images(&self) -> u32 {
        self.num_images
    }

    pub fn style(&self) -> ImageStyle {
        self.style
    }

    pub fn time_created(&self) -> DateTime<Utc> {
        self.time_created
    }
}

/// A configured action of any kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    GenerateText(GenerateText),
    GenerateImage(GenerateImage),
    SummariseText(SummariseText),
}

impl Action {
    /// The action's name
    pub fn name(&self) -> ActionName {
        match self {
            Action::GenerateText(_) => ActionName::GenerateText,
            Action::GenerateImage(_) => ActionName::GenerateImage,
            Action::SummariseText(_) => ActionName::SummariseText,
        }
    }

    pub fn context_id(&self) -> ContextId {
        match self {
            Action::GenerateText(a) => a.context_id(),
            Action::GenerateImage(a) => a.context_id(),
            Action::SummariseText(a) => a.context_id(),
        }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Action::GenerateText(a) => a.user_id(),
            Action::GenerateImage(a) => a.user_id(),
            Action::SummariseText(a) => a.user_id(),
        }
    }

    pub fn prompt_text(&self) -> &str {
        match self {
            Action::GenerateText(a) => a.prompt_text(),
            Action::GenerateImage(a) => a.prompt_text(),
            Action::SummariseText(a) => a.prompt_text(),
        }
    }

    pub fn time_created(&self) -> DateTime<Utc> {
        match self {
            Action::GenerateText(a) => a.time_created(),
            Action::GenerateImage(a) => a.time_created(),
            Action::SummariseText(a) => a.time_created(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.name().display_name()
    }

    pub fn description(&self) -> &'static str {
        self.name().description()
    }

    pub fn system_instruction(&self) -> &'static str {
        self.name().system_instruction()
    }
}

impl From<GenerateText> for Action {
    fn from(action: GenerateText) -> Self {
        Action::GenerateText(action)
    }
}

impl From<GenerateImage> for Action {
    fn from(action: GenerateImage) -> Self {
        Action::GenerateImage(action)
    }
}

impl From<SummariseText> for Action {
    fn from(action: SummariseText) -> Self {
        Action::SummariseText(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_action_name_round_trip() {
        assert_eq!(ActionName::SummariseText.to_string(), "summarise_text");
        assert_eq!(
            ActionName::parse("generate_image").unwrap(),
            ActionName::GenerateImage
        );
        assert!(matches!(
            ActionName::parse("translate_text"),
            Err(CoreError::UnknownAction(name)) if name == "translate_text"
        ));
        assert_eq!(ActionName::iter().count(), 3);
    }

    #[test]
    fn test_configure_summarise_text() {
        let action: Action =
            SummariseText::configure(ContextId::new(1), UserId::new(2), "hi").into();

        assert_eq!(action.name(), ActionName::SummariseText);
        assert_eq!(action.context_id(), ContextId::new(1));
        assert_eq!(action.user_id(), UserId::new(2));
        assert_eq!(action.prompt_text(), "hi");
        assert_eq!(action.display_name(), "Summarise text");
        assert!(action.system_instruction().starts_with("You will receive"));
    }

    #[test]
    fn test_system_instruction_empty_for_generate_text() {
        let action: Action = GenerateText::configure(ContextId::new(1), UserId::new(1), "x").into();
        assert_eq!(action.system_instruction(), "");
        assert_eq!(action.description(), "Generates text based on a text prompt.");
    }

    #[test]
    fn test_configure_generate_image_rejects_zero_images() {
        let result = GenerateImage::configure(
            ContextId::new(1),
            UserId::new(1),
            "a cat",
            ImageQuality::Hd,
            AspectRatio::Square,
            0,
            ImageStyle::Vivid,
        );
        assert!(matches!(result, Err(CoreError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_image_options_parse() {
        assert_eq!("hd".parse::<ImageQuality>().unwrap(), ImageQuality::Hd);
        assert_eq!(
            "landscape".parse::<AspectRatio>().unwrap(),
            AspectRatio::Landscape
        );
        assert_eq!(ImageStyle::Natural.to_string(), "natural");
    }
}
