//! fetchstore-core
//!
//! Building blocks for deriving asynchronous-request store slices from a
//! declarative description.
//!
//! - **domain**: data model (names, actions, params, state, ids, records, errors)
//! - **clock**: time port (SystemClock for production, FixedClock for tests)
//! - **sequence**: the fetch lifecycle as an explicit effect sequence
//! - **control**: control callbacks and their registry
//! - **slice**: the fetch-store factory (action creators, reducer, selectors)
//! - **store**: store assembly and the effect scheduler
//! - **observability**: snapshot views over store state

pub mod clock;
pub mod control;
pub mod domain;
pub mod observability;
pub mod sequence;
pub mod slice;
pub mod store;
