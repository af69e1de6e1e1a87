//! Domain model (names, actions, params, state, ids, records, errors).

pub mod action;
pub mod errors;
pub mod ids;
pub mod names;
pub mod params;
pub mod record;
pub mod state;

pub use action::{Action, ActionBody, ActionType};
pub use errors::{ConfigError, InvariantError, RequestError, StoreError};
pub use ids::{FetchId, FetchIdGenerator};
pub use names::{ActionTypeSet, BaseName, SliceIdents};
pub use params::{Params, ParamsKey};
pub use record::DispatchRecord;
pub use state::{FetchState, ModuleState};
