//! Dispatch journal records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::action::Action;
use super::ids::FetchId;

/// One dispatched action, as seen by the store.
///
/// The journal is what answers "why is this flag false" after the fact:
/// every state transition is attributable to a fetch invocation (when one
/// drove it) and a wall-clock instant.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchRecord {
    /// The invocation that emitted the action, `None` for actions
    /// dispatched directly by a collaborator (e.g. preloading via the
    /// receive creator).
    pub fetch_id: Option<FetchId>,
    pub action: Action,
    pub dispatched_at: DateTime<Utc>,
}

impl DispatchRecord {
    pub fn new(fetch_id: Option<FetchId>, action: Action, dispatched_at: DateTime<Utc>) -> Self {
        Self {
            fetch_id,
            action,
            dispatched_at,
        }
    }
}
