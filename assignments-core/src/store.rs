//! State store with reducer and middleware hooks

use crate::action::Action;
use crate::effect::DispatchResult;
use crate::state::AppState;

/// A reducer handles one action and reports what changed
pub type Reducer = fn(&mut AppState, Action) -> DispatchResult;

/// Middleware trait for intercepting actions
///
/// Implement this to add logging or other cross-cutting concerns to the store.
pub trait Middleware {
    /// Called before the action is dispatched to the reducer
    fn before(&mut self, action: &Action);

    /// Called after the action is processed by the reducer
    fn after(&mut self, action: &Action, result: &DispatchResult);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl Middleware for NoopMiddleware {
    fn before(&mut self, _action: &Action) {}
    fn after(&mut self, _action: &Action, _result: &DispatchResult) {}
}

/// Middleware that logs actions through `tracing`
///
/// `Tick` is skipped; it fires several times a second.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Log after dispatch only
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl Middleware for LoggingMiddleware {
    fn before(&mut self, action: &Action) {
        if self.log_before && !matches!(action, Action::Tick) {
            tracing::debug!(action = %action.summary(), "Dispatching action");
        }
    }

    fn after(&mut self, action: &Action, result: &DispatchResult) {
        if self.log_after && !matches!(action, Action::Tick) {
            tracing::debug!(
                action = %action.name(),
                state_changed = result.changed,
                effects = result.effects.len(),
                "Action processed"
            );
        }
    }
}

/// Centralized state container
///
/// The only way to change state is [`Store::dispatch`], which runs the
/// middleware hooks around the reducer.
pub struct Store<M: Middleware = NoopMiddleware> {
    state: AppState,
    reducer: Reducer,
    middleware: M,
}

impl Store<NoopMiddleware> {
    pub fn new(state: AppState, reducer: Reducer) -> Self {
        Self::with_middleware(state, reducer, NoopMiddleware)
    }
}

impl<M: Middleware> Store<M> {
    pub fn with_middleware(state: AppState, reducer: Reducer, middleware: M) -> Self {
        Self {
            state,
            reducer,
            middleware,
        }
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        self.middleware.before(&action);
        let result = (self.reducer)(&mut self.state, action.clone());
        self.middleware.after(&action, &result);
        result
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Use sparingly - prefer dispatching actions for state changes.
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }
}
