//! # aiaction core contracts
//!
//! Actions, responses and the provider/placement traits shared by the
//! dispatcher, the stores and concrete providers.

pub mod action;
pub mod error;
pub mod provider;
pub mod response;
pub mod types;

pub use action::{
    Action, ActionName, AspectRatio, GenerateImage, GenerateText, ImageQuality, ImageStyle,
    SummariseText,
};
pub use error::{CoreError, Result};
pub use provider::{Placement, Provider, SharedPlacement, SharedProvider};
pub use response::{
    ActionResponse, ImageResponse, NO_PROVIDERS_ERROR_CODE, NO_PROVIDERS_ERROR_MESSAGE,
    ResponsePayload, TextResponse,
};
pub use types::{ActionRecordId, ContextId, UserId};
