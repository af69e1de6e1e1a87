//! The fetch lifecycle as an explicit effect sequence.
//!
//! One invocation describes the actions to dispatch before its request,
//! then the request itself, then the actions to dispatch once it settles.
//! It never performs I/O; the store's scheduler interprets the
//! descriptors.

use serde_json::Value;

use crate::domain::{
    Action, ActionBody, ActionType, ActionTypeSet, FetchId, Params, RequestError,
};

/// Phases of one fetch invocation.
///
/// Transitions:
/// - Idle -> Started -> AwaitingResponse -> Succeeded
/// - Idle -> Started -> AwaitingResponse -> Failed
///
/// `Started` is observable only as the `START_FETCH` dispatch inside
/// `begin`; the sequence suspends in `AwaitingResponse` until the control
/// settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Started,
    AwaitingResponse,
    Succeeded,
    Failed,
}

/// One step the scheduler must run.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Dispatch an action through the store reducer.
    Dispatch(Action),
    /// Route `params` to the control registered under `action_type` and
    /// suspend until it settles. Exactly one per invocation.
    Request {
        action_type: ActionType,
        params: Params,
    },
}

/// Terminal result of a fetch invocation. Exactly one side is populated,
/// so callers can branch without inspecting store state.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub response: Option<Value>,
    pub error: Option<RequestError>,
}

impl FetchOutcome {
    pub fn success(response: Value) -> Self {
        Self {
            response: Some(response),
            error: None,
        }
    }

    pub fn failure(error: RequestError) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.response.is_some()
    }
}

/// A fetch invocation whose params resolved but whose request was not yet
/// issued.
#[derive(Debug, Clone)]
pub struct FetchSequence {
    fetch_id: FetchId,
    types: ActionTypeSet,
    params: Params,
}

impl FetchSequence {
    pub fn new(fetch_id: FetchId, types: ActionTypeSet, params: Params) -> Self {
        Self {
            fetch_id,
            types,
            params,
        }
    }

    pub fn fetch_id(&self) -> FetchId {
        self.fetch_id
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn phase(&self) -> FetchPhase {
        FetchPhase::Idle
    }

    /// Idle -> AwaitingResponse. Emits the `START_FETCH` dispatch followed
    /// by the request effect.
    pub fn begin(self) -> (PendingFetch, Vec<Effect>) {
        let effects = vec![
            Effect::Dispatch(Action::new(
                self.types.start_fetch.clone(),
                ActionBody::StartFetch {
                    params: self.params.clone(),
                },
            )),
            Effect::Request {
                action_type: self.types.fetch.clone(),
                params: self.params.clone(),
            },
        ];
        (
            PendingFetch {
                fetch_id: self.fetch_id,
                types: self.types,
                params: self.params,
            },
            effects,
        )
    }
}

/// A fetch invocation suspended on its request.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    fetch_id: FetchId,
    types: ActionTypeSet,
    params: Params,
}

impl PendingFetch {
    pub fn fetch_id(&self) -> FetchId {
        self.fetch_id
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn phase(&self) -> FetchPhase {
        FetchPhase::AwaitingResponse
    }

    /// AwaitingResponse -> Succeeded | Failed.
    ///
    /// On success the `RECEIVE` action is emitted before `FINISH_FETCH`;
    /// its payload is built the same way the receive creator builds it,
    /// and its invariants (present response, object params) hold by
    /// construction on this path. On failure only `CATCH_FETCH` is
    /// emitted.
    pub fn settle(self, result: Result<Value, RequestError>) -> (SettledFetch, Vec<Effect>) {
        match result {
            Ok(response) => {
                let effects = vec![
                    Effect::Dispatch(Action::new(
                        self.types.receive.clone(),
                        ActionBody::Receive {
                            response: response.clone(),
                            params: self.params.clone(),
                        },
                    )),
                    Effect::Dispatch(Action::new(
                        self.types.finish_fetch.clone(),
                        ActionBody::FinishFetch {
                            params: self.params,
                        },
                    )),
                ];
                (
                    SettledFetch {
                        fetch_id: self.fetch_id,
                        phase: FetchPhase::Succeeded,
                        outcome: FetchOutcome::success(response),
                    },
                    effects,
                )
            }
            Err(error) => {
                let effects = vec![Effect::Dispatch(Action::new(
                    self.types.catch_fetch.clone(),
                    ActionBody::CatchFetch {
                        error: error.clone(),
                        params: self.params,
                    },
                ))];
                (
                    SettledFetch {
                        fetch_id: self.fetch_id,
                        phase: FetchPhase::Failed,
                        outcome: FetchOutcome::failure(error),
                    },
                    effects,
                )
            }
        }
    }
}

/// A completed invocation.
#[derive(Debug, Clone)]
pub struct SettledFetch {
    fetch_id: FetchId,
    phase: FetchPhase,
    outcome: FetchOutcome,
}

impl SettledFetch {
    pub fn fetch_id(&self) -> FetchId {
        self.fetch_id
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn outcome(&self) -> &FetchOutcome {
        &self.outcome
    }

    pub fn into_outcome(self) -> FetchOutcome {
        self.outcome
    }
}
