//! Snapshot views over store state.

use serde::{Deserialize, Serialize};

use crate::domain::ModuleState;

/// Flag counts across every slice of a state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchCounts {
    pub in_flight: usize,
    pub settled: usize,
    pub distinct_params: usize,
}

impl FetchCounts {
    pub fn of<S>(state: &ModuleState<S>) -> Self {
        let mut counts = FetchCounts::default();
        for fetch in state.fetch.values() {
            for flag in fetch.is_fetching.values() {
                counts.distinct_params += 1;
                if *flag {
                    counts.in_flight += 1;
                } else {
                    counts.settled += 1;
                }
            }
        }
        counts
    }
}
