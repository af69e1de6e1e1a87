//! Store actions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::RequestError;
use super::params::Params;

/// Namespaced action-type constant, e.g. `START_FETCH_GET_DATA`.
///
/// Types are derived per base name so independently-created slices can
/// share one store without colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionType(String);

impl ActionType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A dispatched action: namespaced type plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    action_type: ActionType,
    body: ActionBody,
}

/// Payload variants for the dispatched lifecycle actions.
///
/// The `FETCH` role never reaches a reducer; it is the request effect the
/// scheduler routes to a control, so it has no variant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionBody {
    StartFetch {
        params: Params,
    },
    Receive {
        response: Value,
        params: Params,
    },
    FinishFetch {
        params: Params,
    },
    CatchFetch {
        error: RequestError,
        params: Params,
    },
}

impl Action {
    pub fn new(action_type: ActionType, body: ActionBody) -> Self {
        Self { action_type, body }
    }

    pub fn action_type(&self) -> &ActionType {
        &self.action_type
    }

    pub fn body(&self) -> &ActionBody {
        &self.body
    }

    /// Every lifecycle action carries the params it is about.
    pub fn params(&self) -> &Params {
        match &self.body {
            ActionBody::StartFetch { params }
            | ActionBody::Receive { params, .. }
            | ActionBody::FinishFetch { params }
            | ActionBody::CatchFetch { params, .. } => params,
        }
    }
}
