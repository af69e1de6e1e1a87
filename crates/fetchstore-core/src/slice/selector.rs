//! Read-only views over slice state.

use serde_json::Value;

use super::ArgsToParams;
use crate::domain::ModuleState;

/// The slice's selectors.
#[derive(Clone)]
pub struct SliceSelectors {
    state_key: String,
    args_to_params: ArgsToParams,
}

impl SliceSelectors {
    pub(crate) fn new(state_key: String, args_to_params: ArgsToParams) -> Self {
        Self {
            state_key,
            args_to_params,
        }
    }

    /// Is a request with these creator arguments currently in flight?
    ///
    /// `false` when the slice's sub-map is absent (nothing was ever
    /// fetched) and when args_to_params fails. The latter reads as "not
    /// yet resolvable" while upstream selectors are still resolving their
    /// own dependencies, unlike the creator path where the same failure
    /// is fatal for the invocation.
    pub fn is_fetching<S>(&self, state: &ModuleState<S>, args: &[Value]) -> bool {
        let Some(fetch) = state.fetch_state(&self.state_key) else {
            return false;
        };
        let Ok(params) = (self.args_to_params)(args) else {
            return false;
        };
        fetch.flag(&params.key())
    }
}
