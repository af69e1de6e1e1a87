//! Reducer-owned store state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::RequestError;
use super::params::ParamsKey;

/// Per-slice fetch bookkeeping: one in-flight flag per params key, plus
/// the last request error.
///
/// Flag transitions for a single key strictly follow
/// `(unset) -> true -> false`. Keys are never evicted: the map grows by
/// one entry per distinct params key ever fetched and keeps it for the
/// process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchState {
    pub is_fetching: HashMap<ParamsKey, bool>,
    pub error: Option<RequestError>,
}

impl FetchState {
    /// The flag for a key, or `false` when the key was never fetched.
    pub fn flag(&self, key: &ParamsKey) -> bool {
        self.is_fetching.get(key).copied().unwrap_or(false)
    }

    /// Number of requests currently in flight for this slice.
    pub fn in_flight(&self) -> usize {
        self.is_fetching.values().filter(|flag| **flag).count()
    }
}

/// Whole-module state: the collaborator-owned `data` plus one `FetchState`
/// sub-tree per slice, keyed by the slice's `isFetching<Name>` identifier.
///
/// Slices never share sub-trees; the factory derives a distinct state key
/// per base name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleState<S> {
    pub data: S,
    pub fetch: HashMap<String, FetchState>,
}

impl<S> ModuleState<S> {
    pub fn new(data: S) -> Self {
        Self {
            data,
            fetch: HashMap::new(),
        }
    }

    /// The sub-tree for a slice, present once anything was dispatched for
    /// it.
    pub fn fetch_state(&self, state_key: &str) -> Option<&FetchState> {
        self.fetch.get(state_key)
    }
}
