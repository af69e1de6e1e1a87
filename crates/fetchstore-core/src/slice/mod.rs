//! The fetch-store factory.
//!
//! `create_fetch_store` turns a declarative description of one API
//! endpoint into everything a store slice needs: action creators, the
//! control entry, a reducer and selectors. Each invocation owns a
//! disjoint action-type namespace and state key, so many independent call
//! sites can share one store.

mod actions;
mod reducer;
mod selector;

pub use actions::SliceActions;
pub use reducer::{ReceiveReducer, SliceReducer};
pub use selector::SliceSelectors;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::control::ControlCallback;
use crate::domain::{
    ActionType, ActionTypeSet, BaseName, ConfigError, ModuleState, Params, RequestError,
    SliceIdents,
};

/// Maps the fetch creator's call arguments to request params.
///
/// Failures are a programming error on the creator path (logged, fatal
/// for that invocation) and an expected transient condition on the
/// selector path (swallowed).
pub type ArgsToParams = Arc<dyn Fn(&[Value]) -> Result<Params, RequestError> + Send + Sync>;

/// Externally-registered resolvers, keyed by identifier. The factory
/// always leaves this empty; callers merge their own entries in.
pub type ResolverMap = HashMap<String, Arc<dyn ControlCallback>>;

/// Declarative description of one API-backed store slice.
pub struct FetchStoreConfig<S> {
    base_name: String,
    control: Arc<dyn ControlCallback>,
    receive_reducer: Option<ReceiveReducer<S>>,
    args_to_params: Option<ArgsToParams>,
}

impl<S: Clone> FetchStoreConfig<S> {
    pub fn new(base_name: impl Into<String>, control: Arc<dyn ControlCallback>) -> Self {
        Self {
            base_name: base_name.into(),
            control,
            receive_reducer: None,
            args_to_params: None,
        }
    }

    /// Folds a received response into module state. Defaults to an
    /// identity copy.
    pub fn receive_reducer(
        mut self,
        f: impl Fn(&ModuleState<S>, &Value, &Params) -> ModuleState<S> + Send + Sync + 'static,
    ) -> Self {
        self.receive_reducer = Some(Arc::new(f));
        self
    }

    /// Maps creator call arguments to params. Defaults to the empty set.
    pub fn args_to_params(
        mut self,
        f: impl Fn(&[Value]) -> Result<Params, RequestError> + Send + Sync + 'static,
    ) -> Self {
        self.args_to_params = Some(Arc::new(f));
        self
    }
}

/// Everything one slice contributes to a store.
pub struct FetchStoreSlice<S> {
    pub idents: SliceIdents,
    pub action_types: ActionTypeSet,
    pub actions: SliceActions,
    pub control: Arc<dyn ControlCallback>,
    pub reducer: SliceReducer<S>,
    pub resolvers: ResolverMap,
    pub selectors: SliceSelectors,
}

impl<S> FetchStoreSlice<S> {
    /// The registry entry for this slice's request effect: the store must
    /// route `FETCH_<NAME>` to this control.
    pub fn control_entry(&self) -> (ActionType, Arc<dyn ControlCallback>) {
        (self.action_types.fetch.clone(), Arc::clone(&self.control))
    }
}

/// Synthesize a full slice from its config.
///
/// Fails fast on a malformed base name; everything else about the config
/// is taken as given. The returned parts are merged into a store by the
/// caller (see `StoreBuilder`), which is where cross-slice wiring
/// mistakes surface.
pub fn create_fetch_store<S: Clone>(
    config: FetchStoreConfig<S>,
) -> Result<FetchStoreSlice<S>, ConfigError> {
    let base = BaseName::new(config.base_name)?;
    let idents = SliceIdents::new(&base);
    let types = ActionTypeSet::new(&base);

    let args_to_params: ArgsToParams = config
        .args_to_params
        .unwrap_or_else(|| Arc::new(|_args: &[Value]| Ok(Params::empty())));
    let receive_reducer: ReceiveReducer<S> = config.receive_reducer.unwrap_or_else(|| {
        Arc::new(|state: &ModuleState<S>, _response: &Value, _params: &Params| state.clone())
    });

    let actions = SliceActions::new(idents.clone(), types.clone(), Arc::clone(&args_to_params));
    let reducer = SliceReducer::new(idents.is_fetching.clone(), types.clone(), receive_reducer);
    let selectors = SliceSelectors::new(idents.is_fetching.clone(), args_to_params);

    Ok(FetchStoreSlice {
        idents,
        action_types: types,
        actions,
        control: config.control,
        reducer,
        resolvers: ResolverMap::new(),
        selectors,
    })
}
