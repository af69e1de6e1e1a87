//! Error types for the two failure tiers.
//!
//! Configuration and invariant errors are programming mistakes by the
//! integrating module and surface as hard `Err`s at construction/call
//! time. Request errors are runtime conditions and travel through store
//! state and fetch outcomes instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::action::ActionType;

/// Rejected slice configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("base name must not be empty")]
    EmptyBaseName,

    #[error("base name must be lowerCamelCase ASCII, got '{0}'")]
    InvalidBaseName(String),
}

/// Misuse of the receive action creator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("receive requires a response")]
    MissingResponse,

    #[error("params must be a JSON object")]
    NonObjectParams,
}

/// A failed request, or a failed attempt to build its params.
///
/// Cloneable and serializable so the same value can sit in store state
/// (`FetchState::error`) and in the terminal `FetchOutcome` at once. Each
/// new failure overwrites the stored one; errors are not accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Routing failures at the store/scheduler boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("control not found for action_type={0}")]
    ControlNotFound(ActionType),

    #[error("duplicate control for action_type={0}")]
    DuplicateControl(ActionType),
}
