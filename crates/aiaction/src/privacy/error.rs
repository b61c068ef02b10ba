use thiserror::Error;

use crate::action_register::ActionRegisterError;
use crate::policy::PolicyError;

#[derive(Error, Debug)]
pub enum PrivacyError {
    #[error("Action register error: {0}")]
    ActionRegister(#[from] ActionRegisterError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),
}

pub type Result<T> = std::result::Result<T, PrivacyError>;
