//! Per-operation loading/error/success tracking.
//!
//! Independent parts of the UI (one list, one row, one form) report the
//! status of their in-flight work under their own key and never see each
//! other's state.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsyncOperationState {
    pub is_loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

static DEFAULT_STATE: AsyncOperationState = AsyncOperationState {
    is_loading: false,
    error: None,
    success: false,
};

#[derive(Debug, Clone, Default)]
pub struct AsyncStateRegistry {
    states: HashMap<String, AsyncOperationState>,
}

impl AsyncStateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, key: impl Into<String>) -> &mut AsyncOperationState {
        self.states.entry(key.into()).or_default()
    }

    /// Starting to load clears the key's error and its success flag; stopping
    /// leaves both untouched.
    pub fn set_loading(&mut self, key: impl Into<String>, loading: bool) {
        let state = self.entry(key);
        state.is_loading = loading;
        if loading {
            state.error = None;
            state.success = false;
        }
    }

    /// `Some` records a failure and ends loading. `None` only clears the
    /// error.
    pub fn set_error(&mut self, key: impl Into<String>, error: Option<String>) {
        let state = self.entry(key);
        match error {
            Some(message) => {
                state.is_loading = false;
                state.success = false;
                state.error = Some(message);
            }
            None => state.error = None,
        }
    }

    pub fn set_success(&mut self, key: impl Into<String>, success: bool) {
        let state = self.entry(key);
        state.is_loading = false;
        state.error = None;
        state.success = success;
    }

    pub fn clear_state(&mut self, key: &str) {
        self.states.remove(key);
    }

    pub fn clear_all_states(&mut self) {
        self.states.clear();
    }

    /// State for `key`; untracked keys read as the default state.
    pub fn get(&self, key: &str) -> &AsyncOperationState {
        self.states.get(key).unwrap_or(&DEFAULT_STATE)
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.get(key).is_loading
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.get(key).error.as_deref()
    }

    pub fn is_success(&self, key: &str) -> bool {
        self.get(key).success
    }

    pub fn is_any_loading(&self) -> bool {
        self.states.values().any(|s| s.is_loading)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AsyncOperationState)> {
        self.states.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Loading flags for a list view's own fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationLoading {
    pub loading_page: bool,
    pub searching: bool,
    pub filtering: bool,
}

impl PaginationLoading {
    pub fn is_busy(&self) -> bool {
        self.loading_page || self.searching || self.filtering
    }
}
