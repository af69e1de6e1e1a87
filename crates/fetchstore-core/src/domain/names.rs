//! Base-name validation and the identifiers derived from it.

use std::fmt;

use serde::Serialize;

use super::action::ActionType;
use super::errors::ConfigError;

/// Validated lowerCamelCase base name of one fetch-store slice, e.g.
/// `getData` or `saveSettings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseName(String);

impl BaseName {
    pub fn new(s: impl Into<String>) -> Result<Self, ConfigError> {
        let s = s.into();
        let Some(first) = s.chars().next() else {
            return Err(ConfigError::EmptyBaseName);
        };
        if !first.is_ascii_lowercase() || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidBaseName(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First character uppercased: `getData` -> `GetData`.
    pub fn pascal(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    /// `_` inserted between a lowercase letter or digit and a following
    /// uppercase letter, then uppercased: `saveSettings` -> `SAVE_SETTINGS`.
    pub fn screaming_snake(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 4);
        let mut prev_lower_or_digit = false;
        for c in self.0.chars() {
            if c.is_ascii_uppercase() && prev_lower_or_digit {
                out.push('_');
            }
            prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c.to_ascii_uppercase());
        }
        out
    }
}

impl fmt::Display for BaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The five namespaced action-type constants of one slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypeSet {
    pub fetch: ActionType,
    pub start_fetch: ActionType,
    pub finish_fetch: ActionType,
    pub catch_fetch: ActionType,
    pub receive: ActionType,
}

impl ActionTypeSet {
    pub fn new(base: &BaseName) -> Self {
        let name = base.screaming_snake();
        Self {
            fetch: ActionType::new(format!("FETCH_{name}")),
            start_fetch: ActionType::new(format!("START_FETCH_{name}")),
            finish_fetch: ActionType::new(format!("FINISH_FETCH_{name}")),
            catch_fetch: ActionType::new(format!("CATCH_FETCH_{name}")),
            receive: ActionType::new(format!("RECEIVE_{name}")),
        }
    }

    /// Does this slice's namespace own the given action type?
    pub fn contains(&self, action_type: &ActionType) -> bool {
        [
            &self.fetch,
            &self.start_fetch,
            &self.finish_fetch,
            &self.catch_fetch,
            &self.receive,
        ]
        .into_iter()
        .any(|own| own == action_type)
    }
}

/// Identifier registry for one slice: a fixed set of semantic roles mapped
/// to generated names, built once at factory time.
///
/// Keeping these as typed fields (rather than dynamically-keyed
/// properties) is what lets the rest of the crate refer to "the selector"
/// or "the state key" without string plumbing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceIdents {
    /// `fetch<PascalName>`, the fetch action creator.
    pub fetch_action: String,
    /// `receive<PascalName>`, the receive action creator.
    pub receive_action: String,
    /// `isFetching<PascalName>`, the selector and the state key the
    /// slice's sub-tree lives under.
    pub is_fetching: String,
}

impl SliceIdents {
    pub fn new(base: &BaseName) -> Self {
        let pascal = base.pascal();
        Self {
            fetch_action: format!("fetch{pascal}"),
            receive_action: format!("receive{pascal}"),
            is_fetching: format!("isFetching{pascal}"),
        }
    }
}
