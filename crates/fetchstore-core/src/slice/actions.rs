//! Action creators for one slice.

use serde_json::Value;
use tracing::error;

use super::ArgsToParams;
use crate::domain::{
    Action, ActionBody, ActionTypeSet, FetchId, InvariantError, Params, RequestError, SliceIdents,
};
use crate::sequence::FetchSequence;

/// The slice's two action creators.
#[derive(Clone)]
pub struct SliceActions {
    idents: SliceIdents,
    types: ActionTypeSet,
    args_to_params: ArgsToParams,
}

impl SliceActions {
    pub(crate) fn new(idents: SliceIdents, types: ActionTypeSet, args_to_params: ArgsToParams) -> Self {
        Self {
            idents,
            types,
            args_to_params,
        }
    }

    pub fn idents(&self) -> &SliceIdents {
        &self.idents
    }

    pub fn action_types(&self) -> &ActionTypeSet {
        &self.types
    }

    /// The fetch creator: maps call arguments to params and opens the
    /// effect sequence.
    ///
    /// An args_to_params failure is a programming error at the call site,
    /// not a runtime condition: it is logged here and returned before a
    /// single action is dispatched, so in-flight state stays untouched.
    pub fn fetch(&self, fetch_id: FetchId, args: &[Value]) -> Result<FetchSequence, RequestError> {
        let params = match (self.args_to_params)(args) {
            Ok(params) => params,
            Err(err) => {
                error!(creator = %self.idents.fetch_action, %fetch_id, "args_to_params failed: {err}");
                return Err(err);
            }
        };
        Ok(FetchSequence::new(fetch_id, self.types.clone(), params))
    }

    /// The receive creator. Pure and synchronous.
    ///
    /// Rejects a missing response or non-object params; whether the
    /// response shape makes business sense is the receive reducer's
    /// problem, not checked here.
    pub fn receive(
        &self,
        response: Option<Value>,
        params: &Value,
    ) -> Result<Action, InvariantError> {
        let response = response.ok_or(InvariantError::MissingResponse)?;
        let params = Params::from_value(params.clone())?;
        Ok(Action::new(
            self.types.receive.clone(),
            ActionBody::Receive { response, params },
        ))
    }
}
