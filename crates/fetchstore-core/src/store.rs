//! Store assembly and the effect scheduler.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::control::ControlRegistry;
use crate::domain::{
    Action, DispatchRecord, FetchId, FetchIdGenerator, ModuleState, RequestError, StoreError,
};
use crate::observability::FetchCounts;
use crate::sequence::{Effect, FetchOutcome};
use crate::slice::{FetchStoreSlice, SliceActions, SliceReducer};

/// Assembles slices into one store.
///
/// Merging is the collaborator's concern, not the factory's: any number
/// of independently-created slices register here, and registration fails
/// fast on a duplicate control type (two slices sharing a base name).
pub struct StoreBuilder<S> {
    initial: S,
    controls: ControlRegistry,
    reducers: Vec<SliceReducer<S>>,
    clock: Arc<dyn Clock>,
}

impl<S: Clone + Send + 'static> StoreBuilder<S> {
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            controls: ControlRegistry::new(),
            reducers: Vec::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Swap the clock; tests use `FixedClock`.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register one slice's control and reducer.
    pub fn slice(mut self, slice: &FetchStoreSlice<S>) -> Result<Self, StoreError> {
        let (action_type, control) = slice.control_entry();
        self.controls.register(action_type, control)?;
        self.reducers.push(slice.reducer.clone());
        Ok(self)
    }

    pub fn build(self) -> Store<S> {
        Store {
            inner: Arc::new(Mutex::new(StoreInner {
                state: ModuleState::new(self.initial),
                journal: Vec::new(),
            })),
            controls: Arc::new(self.controls),
            reducers: Arc::new(self.reducers),
            ids: FetchIdGenerator::new(Arc::clone(&self.clock)),
            clock: self.clock,
        }
    }
}

struct StoreInner<S> {
    state: ModuleState<S>,
    journal: Vec<DispatchRecord>,
}

/// The running store: reducer-owned state behind one mutex, the merged
/// control registry, and the scheduler that interprets fetch effect
/// sequences.
///
/// All mutation flows through `dispatch`; the lock is never held across
/// an await, so any number of `run_fetch` calls can be in flight at once.
/// The controls live outside the lock entirely (immutable after build).
pub struct Store<S> {
    inner: Arc<Mutex<StoreInner<S>>>,
    controls: Arc<ControlRegistry>,
    reducers: Arc<Vec<SliceReducer<S>>>,
    ids: FetchIdGenerator<Arc<dyn Clock>>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            controls: Arc::clone(&self.controls),
            reducers: Arc::clone(&self.reducers),
            ids: self.ids.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: Clone + Send + 'static> Store<S> {
    /// Dispatch an action on behalf of a collaborator (e.g. preloading
    /// data through the receive creator, outside any fetch lifecycle).
    pub async fn dispatch(&self, action: Action) {
        self.dispatch_with(None, action).await;
    }

    async fn dispatch_with(&self, fetch_id: Option<FetchId>, action: Action) {
        let mut inner = self.inner.lock().await;
        let mut next = inner.state.clone();
        for reducer in self.reducers.iter() {
            next = reducer.reduce(&next, &action);
        }
        inner.state = next;
        inner
            .journal
            .push(DispatchRecord::new(fetch_id, action, self.clock.now()));
    }

    /// Drive one fetch invocation to its terminal outcome.
    ///
    /// This is the injected scheduler from the sequence's point of view:
    /// `Dispatch` effects run against the combined reducer, the single
    /// `Request` effect is routed through the control registry, and the
    /// invocation suspends there until the control settles. There is no
    /// cancellation and no timeout; a started invocation always reaches a
    /// terminal outcome.
    pub async fn run_fetch(
        &self,
        actions: &SliceActions,
        args: &[Value],
    ) -> Result<FetchOutcome, StoreError> {
        let fetch_id = self.ids.generate();

        let sequence = match actions.fetch(fetch_id, args) {
            Ok(sequence) => sequence,
            // Already logged by the creator. Nothing was dispatched, so
            // in-flight state stays untouched.
            Err(error) => return Ok(FetchOutcome::failure(error)),
        };

        let (pending, effects) = sequence.begin();
        let settled = self.run_effects(fetch_id, effects).await?;
        // begin() always issues exactly one request.
        let result = settled.unwrap_or_else(|| Err(RequestError::new("no request was issued")));

        let (done, effects) = pending.settle(result);
        self.run_effects(fetch_id, effects).await?;

        debug!(%fetch_id, phase = ?done.phase(), "fetch settled");
        Ok(done.into_outcome())
    }

    async fn run_effects(
        &self,
        fetch_id: FetchId,
        effects: Vec<Effect>,
    ) -> Result<Option<Result<Value, RequestError>>, StoreError> {
        let mut settled = None;
        for effect in effects {
            match effect {
                Effect::Dispatch(action) => self.dispatch_with(Some(fetch_id), action).await,
                Effect::Request {
                    action_type,
                    params,
                } => {
                    let Some(control) = self.controls.get(&action_type) else {
                        return Err(StoreError::ControlNotFound(action_type));
                    };
                    let control = Arc::clone(control);
                    // The invocation's single suspension point; the state
                    // lock is not held here.
                    settled = Some(control.call(&params).await);
                }
            }
        }
        Ok(settled)
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> ModuleState<S> {
        self.inner.lock().await.state.clone()
    }

    /// Run a read-only view against the current state without cloning it.
    pub async fn select<R>(&self, f: impl FnOnce(&ModuleState<S>) -> R) -> R {
        let inner = self.inner.lock().await;
        f(&inner.state)
    }

    /// Snapshot of the dispatch journal.
    pub async fn journal(&self) -> Vec<DispatchRecord> {
        self.inner.lock().await.journal.clone()
    }

    /// Flag counts across every slice, for status output.
    pub async fn counts(&self) -> FetchCounts {
        let inner = self.inner.lock().await;
        FetchCounts::of(&inner.state)
    }

    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlCallback;
    use crate::domain::Params;
    use crate::slice::{FetchStoreConfig, create_fetch_store};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, Default)]
    struct Cache {
        responses: HashMap<String, Value>,
    }

    struct FixedControl(Value);

    #[async_trait]
    impl ControlCallback for FixedControl {
        async fn call(&self, _params: &Params) -> Result<Value, RequestError> {
            Ok(self.0.clone())
        }
    }

    struct FailingControl(&'static str);

    #[async_trait]
    impl ControlCallback for FailingControl {
        async fn call(&self, _params: &Params) -> Result<Value, RequestError> {
            Err(RequestError::new(self.0))
        }
    }

    /// Resolves only once released, so tests can observe the in-flight
    /// window.
    struct GatedControl {
        release: Arc<Notify>,
        response: Value,
    }

    #[async_trait]
    impl ControlCallback for GatedControl {
        async fn call(&self, _params: &Params) -> Result<Value, RequestError> {
            self.release.notified().await;
            Ok(self.response.clone())
        }
    }

    struct SlowControl(Value);

    #[async_trait]
    impl ControlCallback for SlowControl {
        async fn call(&self, _params: &Params) -> Result<Value, RequestError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(self.0.clone())
        }
    }

    fn data_slice(
        base_name: &str,
        control: Arc<dyn ControlCallback>,
    ) -> crate::slice::FetchStoreSlice<Cache> {
        create_fetch_store(
            FetchStoreConfig::new(base_name, control)
                .args_to_params(|args| {
                    let id = args
                        .first()
                        .cloned()
                        .ok_or_else(|| RequestError::new("id required"))?;
                    Params::from_value(json!({ "id": id }))
                        .map_err(|err| RequestError::new(err.to_string()))
                })
                .receive_reducer(|state: &crate::domain::ModuleState<Cache>, response, params| {
                    let mut next = state.clone();
                    next.data
                        .responses
                        .insert(params.key().as_str().to_string(), response.clone());
                    next
                }),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn success_lifecycle_raises_then_lowers_the_flag() {
        let release = Arc::new(Notify::new());
        let slice = data_slice(
            "getData",
            Arc::new(GatedControl {
                release: Arc::clone(&release),
                response: json!({ "value": 42 }),
            }),
        );
        let store = StoreBuilder::new(Cache::default())
            .slice(&slice)
            .unwrap()
            .build();

        let handle = tokio::spawn({
            let store = store.clone();
            let actions = slice.actions.clone();
            async move { store.run_fetch(&actions, &[json!(1)]).await }
        });

        // Let the invocation reach its suspension point.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let state = store.state().await;
        assert!(slice.selectors.is_fetching(&state, &[json!(1)]));

        release.notify_one();
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.response, Some(json!({ "value": 42 })));
        assert_eq!(outcome.error, None);

        let state = store.state().await;
        assert!(!slice.selectors.is_fetching(&state, &[json!(1)]));
        let key = Params::from_value(json!({ "id": 1 })).unwrap().key();
        assert_eq!(
            state.data.responses.get(key.as_str()),
            Some(&json!({ "value": 42 }))
        );
        assert_eq!(
            state.fetch_state(&slice.idents.is_fetching).unwrap().error,
            None
        );
    }

    #[tokio::test]
    async fn failure_lowers_the_flag_and_records_the_error() {
        let slice = data_slice("getData", Arc::new(FailingControl("network")));
        let store = StoreBuilder::new(Cache::default())
            .slice(&slice)
            .unwrap()
            .build();

        let outcome = store.run_fetch(&slice.actions, &[json!(1)]).await.unwrap();
        assert_eq!(outcome.response, None);
        assert_eq!(outcome.error, Some(RequestError::new("network")));

        let state = store.state().await;
        assert!(!slice.selectors.is_fetching(&state, &[json!(1)]));
        let fetch = state.fetch_state(&slice.idents.is_fetching).unwrap();
        assert_eq!(fetch.error, Some(RequestError::new("network")));
        assert!(state.data.responses.is_empty());
    }

    #[tokio::test]
    async fn args_failure_dispatches_nothing() {
        let slice = data_slice("getData", Arc::new(FixedControl(json!(null))));
        let store = StoreBuilder::new(Cache::default())
            .slice(&slice)
            .unwrap()
            .build();

        // No args: args_to_params fails before anything is dispatched.
        let outcome = store.run_fetch(&slice.actions, &[]).await.unwrap();
        assert_eq!(outcome.error, Some(RequestError::new("id required")));

        let state = store.state().await;
        assert!(state.fetch.is_empty());
        assert!(store.journal().await.is_empty());
    }

    #[tokio::test]
    async fn journal_orders_the_lifecycle() {
        let slice = data_slice("getData", Arc::new(FixedControl(json!({ "value": 42 }))));
        let store = StoreBuilder::new(Cache::default())
            .slice(&slice)
            .unwrap()
            .build();

        store
            .run_fetch(&slice.actions, &[json!(1)])
            .await
            .unwrap();

        let journal = store.journal().await;
        let types: Vec<&str> = journal
            .iter()
            .map(|record| record.action.action_type().as_str())
            .collect();
        assert_eq!(
            types,
            vec![
                "START_FETCH_GET_DATA",
                "RECEIVE_GET_DATA",
                "FINISH_FETCH_GET_DATA"
            ]
        );
        // All three belong to the same invocation.
        let first = journal[0].fetch_id;
        assert!(first.is_some());
        assert!(journal.iter().all(|record| record.fetch_id == first));
    }

    #[tokio::test]
    async fn equal_params_share_one_flag_entry_regardless_of_order() {
        // Build the params object in caller-supplied order so the two
        // invocations insert keys differently.
        let slice: crate::slice::FetchStoreSlice<Cache> = create_fetch_store(
            FetchStoreConfig::new(
                "getReport",
                Arc::new(FixedControl(json!({ "rows": [] }))) as Arc<dyn ControlCallback>,
            )
            .args_to_params(|args| {
                let mut map = serde_json::Map::new();
                for pair in args {
                    let key = pair[0]
                        .as_str()
                        .ok_or_else(|| RequestError::new("key must be a string"))?;
                    map.insert(key.to_string(), pair[1].clone());
                }
                Params::from_value(Value::Object(map))
                    .map_err(|err| RequestError::new(err.to_string()))
            }),
        )
        .unwrap();
        let store = StoreBuilder::new(Cache::default())
            .slice(&slice)
            .unwrap()
            .build();

        store
            .run_fetch(
                &slice.actions,
                &[json!(["from", "2024-01-01"]), json!(["to", "2024-01-31"])],
            )
            .await
            .unwrap();
        store
            .run_fetch(
                &slice.actions,
                &[json!(["to", "2024-01-31"]), json!(["from", "2024-01-01"])],
            )
            .await
            .unwrap();

        let counts = store.counts().await;
        assert_eq!(counts.distinct_params, 1);
        assert_eq!(counts.in_flight, 0);
        assert_eq!(counts.settled, 1);
    }

    #[tokio::test]
    async fn concurrent_same_params_invocations_both_complete() {
        let slice = data_slice("getData", Arc::new(SlowControl(json!({ "value": 1 }))));
        let store = StoreBuilder::new(Cache::default())
            .slice(&slice)
            .unwrap()
            .build();

        let spawn = |store: Store<Cache>, actions: crate::slice::SliceActions| {
            tokio::spawn(async move { store.run_fetch(&actions, &[json!(1)]).await })
        };
        let a = spawn(store.clone(), slice.actions.clone());
        let b = spawn(store.clone(), slice.actions.clone());

        assert!(a.await.unwrap().unwrap().is_success());
        assert!(b.await.unwrap().unwrap().is_success());

        // Both lifecycles ran in full; the shared flag ends lowered.
        let state = store.state().await;
        assert!(!slice.selectors.is_fetching(&state, &[json!(1)]));
        let journal = store.journal().await;
        let starts = journal
            .iter()
            .filter(|record| record.action.action_type().as_str() == "START_FETCH_GET_DATA")
            .count();
        assert_eq!(starts, 2);
        assert_eq!(store.counts().await.distinct_params, 1);
    }

    #[tokio::test]
    async fn slices_with_distinct_names_coexist() {
        let data = data_slice("getData", Arc::new(FixedControl(json!({ "value": 1 }))));
        let user = data_slice("getUser", Arc::new(FixedControl(json!({ "name": "ann" }))));
        let store = StoreBuilder::new(Cache::default())
            .slice(&data)
            .unwrap()
            .slice(&user)
            .unwrap()
            .build();

        store.run_fetch(&data.actions, &[json!(1)]).await.unwrap();
        store.run_fetch(&user.actions, &[json!(7)]).await.unwrap();

        let state = store.state().await;
        assert!(state.fetch_state("isFetchingGetData").is_some());
        assert!(state.fetch_state("isFetchingGetUser").is_some());
        assert_eq!(store.counts().await.distinct_params, 2);
    }

    #[tokio::test]
    async fn duplicate_slice_registration_fails_fast() {
        let a = data_slice("getData", Arc::new(FixedControl(json!(null))));
        let b = data_slice("getData", Arc::new(FixedControl(json!(null))));

        let result = StoreBuilder::new(Cache::default())
            .slice(&a)
            .unwrap()
            .slice(&b);
        assert!(matches!(result, Err(StoreError::DuplicateControl(_))));
    }

    #[tokio::test]
    async fn unregistered_control_is_a_routing_error() {
        let registered = data_slice("getData", Arc::new(FixedControl(json!(null))));
        let orphan = data_slice("getUser", Arc::new(FixedControl(json!(null))));
        let store = StoreBuilder::new(Cache::default())
            .slice(&registered)
            .unwrap()
            .build();

        let result = store.run_fetch(&orphan.actions, &[json!(1)]).await;
        assert!(matches!(result, Err(StoreError::ControlNotFound(_))));
    }

    #[tokio::test]
    async fn external_receive_dispatch_preloads_data() {
        let slice = data_slice("getData", Arc::new(FixedControl(json!(null))));
        let store = StoreBuilder::new(Cache::default())
            .slice(&slice)
            .unwrap()
            .build();

        let action = slice
            .actions
            .receive(Some(json!({ "value": 9 })), &json!({ "id": 1 }))
            .unwrap();
        store.dispatch(action).await;

        let state = store.state().await;
        let key = Params::from_value(json!({ "id": 1 })).unwrap().key();
        assert_eq!(
            state.data.responses.get(key.as_str()),
            Some(&json!({ "value": 9 }))
        );
        // Preloading never raises a flag.
        assert!(!slice.selectors.is_fetching(&state, &[json!(1)]));

        let journal = store.journal().await;
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].fetch_id, None);
    }
}
