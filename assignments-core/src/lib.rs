//! List-state controller for assignment records
//!
//! The crate keeps an append-only cache of loaded assignments, a
//! user-controlled [`FilterState`], and derives the visible list from both.
//! It follows a Redux/Elm-style architecture:
//!
//! - **Action**: every message the dispatcher can receive ([`Action`])
//! - **Reducer**: a single transition function returning a [`DispatchResult`]
//! - **Effect**: declarative requests for loads, saves and recomputes
//! - **Runtime**: the one loop that owns state, feeding input events, task
//!   results and ticks through the reducer in arrival order
//!
//! Background work (loading from a [`DataSource`], saving through a
//! [`ConfigStore`]) runs on tokio tasks that only ever report back by
//! sending an action.
//!
//! # Basic Example
//!
//! ```ignore
//! use assignments_core::prelude::*;
//!
//! let config: Arc<dyn ConfigStore> = Arc::new(MyConfigStore::open()?);
//! let state = initial_state(config.as_ref()).await;
//! let mut runtime = Runtime::new(state, config)
//!     .with_source(Arc::new(MySource::new()));
//! runtime.run_terminal(&mut my_renderer).await?;
//! ```

pub mod action;
pub mod effect;
pub mod error;
pub mod event;
pub mod filter;
pub mod keybindings;
pub mod model;
pub mod reducer;
pub mod runtime;
pub mod source;
pub mod state;
pub mod store;
pub mod tasks;
pub mod testing;
pub mod title;

pub use action::Action;
pub use effect::{DispatchResult, Effect};
pub use error::{LoadError, PersistError, SelectionError};
pub use event::{process_raw_event, spawn_event_poller, EventKind, PollerConfig, RawEvent};
pub use filter::{visible, FilterState, HideReason, VisibleItem};
pub use keybindings::{format_key_for_display, parse_key_string, Binding, Command, Keybindings};
pub use model::{Assignment, Course};
pub use reducer::reducer;
pub use runtime::{initial_state, Flow, Renderer, Runtime};
pub use source::{ConfigStore, DataSource};
pub use state::{AppState, Cache, StatusMessage, STATUS_LIFETIME};
pub use store::{LoggingMiddleware, Middleware, NoopMiddleware, Reducer, Store};
pub use tasks::{Scheduler, TaskKey, TaskManager};
pub use title::compose_title;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::effect::{DispatchResult, Effect};
    pub use crate::error::{LoadError, PersistError};
    pub use crate::event::EventKind;
    pub use crate::filter::{FilterState, HideReason, VisibleItem};
    pub use crate::keybindings::{format_key_for_display, Binding, Keybindings};
    pub use crate::model::{Assignment, Course};
    pub use crate::runtime::{initial_state, Renderer, Runtime};
    pub use crate::source::{ConfigStore, DataSource};
    pub use crate::state::AppState;
    pub use crate::store::{LoggingMiddleware, Store};
}
