//! Demo: one fetch-store slice wired to a fake search API.
//!
//! Shows the full lifecycle: a flaky first request that lands in the
//! error branch, concurrent fetches with distinct and identical params,
//! and the state/journal snapshots at the end.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::time::sleep;

use fetchstore_core::control::ControlCallback;
use fetchstore_core::domain::{Params, RequestError};
use fetchstore_core::slice::{FetchStoreConfig, create_fetch_store};
use fetchstore_core::store::StoreBuilder;

/// Fake search API: the first `remaining_failures` calls reject, later
/// ones resolve after a short delay.
struct FakeSearchApi {
    remaining_failures: AtomicU32,
}

impl FakeSearchApi {
    fn new(failures: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(failures),
        }
    }
}

#[async_trait]
impl ControlCallback for FakeSearchApi {
    async fn call(&self, params: &Params) -> Result<Value, RequestError> {
        sleep(Duration::from_millis(80)).await;

        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(RequestError::new(format!(
                "503 service unavailable (left={left})"
            )));
        }

        let query = params.get("query").and_then(Value::as_str).unwrap_or("");
        Ok(json!({
            "query": query,
            "hits": [format!("{query}: first hit"), format!("{query}: second hit")],
        }))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
struct SearchResults {
    by_query: HashMap<String, Value>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    // (A) Derive the slice from its declarative description.
    let slice = create_fetch_store::<SearchResults>(
        FetchStoreConfig::new("searchPosts", Arc::new(FakeSearchApi::new(1)))
            .args_to_params(|args| {
                let query = args
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| RequestError::new("query must be a string"))?;
                Params::from_value(json!({ "query": query }))
                    .map_err(|err| RequestError::new(err.to_string()))
            })
            .receive_reducer(|state: &fetchstore_core::domain::ModuleState<SearchResults>, response, params| {
                let mut next = state.clone();
                if let Some(query) = params.get("query").and_then(Value::as_str) {
                    next.data.by_query.insert(query.to_string(), response.clone());
                }
                next
            }),
    )
    .expect("valid slice config");

    println!(
        "slice ready: {} / {} / {}",
        slice.idents.fetch_action, slice.idents.receive_action, slice.idents.is_fetching
    );

    // (B) Merge the slice into a store.
    let store = Arc::new(
        StoreBuilder::new(SearchResults::default())
            .slice(&slice)
            .expect("unique slice")
            .build(),
    );

    // (C) First fetch hits the flaky window and lands in the error branch.
    let outcome = store
        .run_fetch(&slice.actions, &[json!("rust")])
        .await
        .expect("control registered");
    println!(
        "first fetch: response={:?} error={:?}",
        outcome.response, outcome.error
    );

    // (D) Concurrent fetches: two distinct queries plus a repeat.
    let handles: Vec<_> = ["rust", "tokio", "rust"]
        .into_iter()
        .map(|query| {
            let store = Arc::clone(&store);
            let actions = slice.actions.clone();
            tokio::spawn(async move { store.run_fetch(&actions, &[json!(query)]).await })
        })
        .collect();

    // While they are in flight, the selector reads true.
    sleep(Duration::from_millis(20)).await;
    let state = store.state().await;
    println!(
        "mid-flight: isFetching(rust)={} isFetching(tokio)={}",
        slice.selectors.is_fetching(&state, &[json!("rust")]),
        slice.selectors.is_fetching(&state, &[json!("tokio")]),
    );

    for handle in handles {
        let outcome = handle
            .await
            .expect("fetch task panicked")
            .expect("control registered");
        match (&outcome.response, &outcome.error) {
            (Some(response), _) => println!("fetch ok: {response}"),
            (_, Some(error)) => println!("fetch failed: {error}"),
            _ => unreachable!("outcome has exactly one populated side"),
        }
    }

    // (E) Final snapshots.
    let state = store.state().await;
    println!(
        "final: isFetching(rust)={} counts={:?}",
        slice.selectors.is_fetching(&state, &[json!("rust")]),
        store.counts().await,
    );
    println!(
        "state: {}",
        serde_json::to_string_pretty(&state).unwrap_or_default()
    );
    println!("journal: {} dispatches", store.journal().await.len());
}
