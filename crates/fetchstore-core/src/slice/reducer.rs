//! Per-slice reducer.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Action, ActionBody, ActionTypeSet, ModuleState, Params, RequestError};

/// Folds a received response into module state.
///
/// Called with the prior state, the raw response and the request params;
/// returns the next state. The factory default is an identity copy.
pub type ReceiveReducer<S> =
    Arc<dyn Fn(&ModuleState<S>, &Value, &Params) -> ModuleState<S> + Send + Sync>;

/// Pure state machine over the slice's five action types.
///
/// Transitions:
/// - `START_FETCH`: flag for the params key -> true
/// - `RECEIVE`: delegated entirely to the receive reducer; flags untouched
/// - `FINISH_FETCH`: flag -> false
/// - `CATCH_FETCH`: flag -> false, `error` overwritten
/// - anything else: plain copy, so the reducer composes inside a combined
///   reducer without eating other slices' actions
#[derive(Clone)]
pub struct SliceReducer<S> {
    state_key: String,
    types: ActionTypeSet,
    receive: ReceiveReducer<S>,
}

impl<S: Clone> SliceReducer<S> {
    pub(crate) fn new(state_key: String, types: ActionTypeSet, receive: ReceiveReducer<S>) -> Self {
        Self {
            state_key,
            types,
            receive,
        }
    }

    /// The `isFetching<Name>` key this slice's sub-tree lives under.
    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    pub fn reduce(&self, state: &ModuleState<S>, action: &Action) -> ModuleState<S> {
        if !self.types.contains(action.action_type()) {
            return state.clone();
        }
        match action.body() {
            ActionBody::StartFetch { params } => self.with_flag(state, params, true, None),
            ActionBody::Receive { response, params } => (self.receive)(state, response, params),
            ActionBody::FinishFetch { params } => self.with_flag(state, params, false, None),
            ActionBody::CatchFetch { error, params } => {
                self.with_flag(state, params, false, Some(error.clone()))
            }
        }
    }

    fn with_flag(
        &self,
        state: &ModuleState<S>,
        params: &Params,
        value: bool,
        error: Option<RequestError>,
    ) -> ModuleState<S> {
        let mut next = state.clone();
        let fetch = next.fetch.entry(self.state_key.clone()).or_default();
        fetch.is_fetching.insert(params.key(), value);
        if let Some(error) = error {
            fetch.error = Some(error);
        }
        next
    }
}
