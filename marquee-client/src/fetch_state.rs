//! Load state for single-entity fetches.

use log::debug;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt::Display;

/// Lifecycle of one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Loaded(T),
    /// Display message of the error that ended the fetch.
    Failed(String),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => FetchState::Loaded(value),
            Err(e) => FetchState::Failed(e.to_string()),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            FetchState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Ticket handed out by [`StateSlot::begin`]; only the latest one may finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug)]
struct SlotInner<T> {
    generation: u64,
    state: FetchState<T>,
}

/// Shared [`FetchState`] that ignores results of superseded loads.
#[derive(Debug)]
pub struct StateSlot<T> {
    name: &'static str,
    inner: Mutex<SlotInner<T>>,
}

impl<T: Clone> StateSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(SlotInner {
                generation: 0,
                state: FetchState::Idle,
            }),
        }
    }

    /// Start a load: previous data is dropped and the state becomes `Loading`.
    pub fn begin(&self) -> Generation {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = FetchState::Loading;
        Generation(inner.generation)
    }

    /// Store the result of the load started as `generation`.
    ///
    /// Returns false, leaving the state untouched, when a newer load or a
    /// reset happened in between.
    pub fn finish<E: Display>(&self, generation: Generation, result: Result<T, E>) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation.0 {
            debug!(
                "[StateSlot] Discarding stale {} result (generation {} < {})",
                self.name, generation.0, inner.generation
            );
            return false;
        }
        inner.state = FetchState::from_result(result);
        true
    }

    /// Back to `Idle`; loads in flight become stale.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = FetchState::Idle;
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.inner.lock().state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().state.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.lock().state.error().map(str::to_owned)
    }
}
