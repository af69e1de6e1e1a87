//! Control callbacks and their registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ActionType, Params, RequestError, StoreError};

/// Performs the actual request for one slice.
///
/// The scheduler routes a `FETCH_<NAME>` effect here and merely forwards
/// the result; there are no retries and no timeouts. A rejection
/// propagates straight to the failure branch of the invocation.
#[async_trait]
pub trait ControlCallback: Send + Sync {
    async fn call(&self, params: &Params) -> Result<Value, RequestError>;
}

/// Registry of controls (action_type -> control).
///
/// Design:
/// - Built during store assembly (mutable).
/// - Used during runtime (immutable).
/// This avoids locks and keeps request routing cheap.
#[derive(Default)]
pub struct ControlRegistry {
    controls: HashMap<ActionType, Arc<dyn ControlCallback>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self {
            controls: HashMap::new(),
        }
    }

    /// Register a control for an action type.
    ///
    /// Two slices can only collide here by sharing a base name, which is a
    /// wiring mistake; registration fails instead of overwriting.
    pub fn register(
        &mut self,
        action_type: ActionType,
        control: Arc<dyn ControlCallback>,
    ) -> Result<(), StoreError> {
        if self.controls.contains_key(&action_type) {
            return Err(StoreError::DuplicateControl(action_type));
        }
        self.controls.insert(action_type, control);
        Ok(())
    }

    pub fn get(&self, action_type: &ActionType) -> Option<&Arc<dyn ControlCallback>> {
        self.controls.get(action_type)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}
