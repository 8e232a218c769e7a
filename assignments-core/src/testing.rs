//! Test utilities
//!
//! - [`key`]: Create a `KeyEvent` from a string (e.g., `key("ctrl+c")`)
//! - [`TestHarness`]: reducer driver that runs recomputes inline at a fixed instant
//! - Fixtures: [`course`], [`assignment`], [`StaticSource`], [`FailingSource`],
//!   [`MemoryConfigStore`]
//! - Assertion macros for emitted actions
//!
//! # Example
//!
//! ```ignore
//! use assignments_core::testing::{assignment, course, TestHarness};
//!
//! let cs = course("CS101");
//! let mut harness = TestHarness::default();
//! harness.dispatch(Action::BatchLoaded {
//!     source: "demo".into(),
//!     items: vec![assignment("A1", &cs, None, false)],
//! });
//! assert_eq!(harness.visible_ids(), vec!["A1"]);
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

use crate::action::Action;
use crate::effect::{DispatchResult, Effect};
use crate::error::{LoadError, PersistError};
use crate::filter::FilterState;
use crate::keybindings::parse_key_string;
use crate::model::{Assignment, Course};
use crate::reducer::reducer;
use crate::source::{ConfigStore, DataSource};
use crate::state::AppState;

/// Create a `KeyEvent` from a key string.
///
/// # Panics
///
/// Panics if the key string cannot be parsed.
pub fn key(s: &str) -> KeyEvent {
    parse_key_string(s).unwrap_or_else(|| panic!("Invalid key string: {:?}", s))
}

/// Create a `KeyEvent` for a character with no modifiers.
pub fn char_key(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::empty(),
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Create a `KeyEvent` for a character with Ctrl modifier.
pub fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::CONTROL,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// 2024-03-01 12:00:00 UTC
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A course named "Course {id}"
pub fn course(id: &str) -> Arc<Course> {
    Arc::new(Course::new(
        id,
        format!("Course {id}"),
        format!("https://eclass.example.org/courses/{id}"),
    ))
}

/// An assignment titled "Assignment {id}"
pub fn assignment(
    id: &str,
    course: &Arc<Course>,
    deadline: Option<DateTime<Utc>>,
    submitted: bool,
) -> Assignment {
    Assignment {
        id: id.to_string(),
        title: format!("Assignment {id}"),
        deadline,
        submitted,
        course: Arc::clone(course),
    }
}

/// Drives the reducer the way the runtime does, without channels.
///
/// `Effect::Recompute` is applied immediately at [`TestHarness::now`]; all
/// other effects are collected for inspection.
pub struct TestHarness {
    pub state: AppState,
    pub now: DateTime<Utc>,
    effects: Vec<Effect>,
}

impl TestHarness {
    pub fn new(filter: FilterState) -> Self {
        Self {
            state: AppState::new(filter),
            now: fixed_now(),
            effects: Vec::new(),
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Dispatch an action and run any recompute it asks for.
    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        let result = reducer(&mut self.state, action);
        for effect in &result.effects {
            match effect {
                Effect::Recompute => {
                    reducer(&mut self.state, Action::Recompute(self.now));
                }
                other => self.effects.push(other.clone()),
            }
        }
        result
    }

    /// Take the non-recompute effects collected so far.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Ids of the visible items, in display order
    pub fn visible_ids(&self) -> Vec<String> {
        self.state
            .visible_items()
            .map(|(_, assignment)| assignment.id.clone())
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

/// Data source returning a fixed batch, optionally after a delay
pub struct StaticSource {
    name: String,
    items: Vec<Assignment>,
    delay: Option<Duration>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, items: Vec<Assignment>) -> Self {
        Self {
            name: name.into(),
            items,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<Assignment>, LoadError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.items.clone())
    }
}

/// Data source that always fails with the same error
pub struct FailingSource {
    name: String,
    error: LoadError,
}

impl FailingSource {
    pub fn new(name: impl Into<String>, error: LoadError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

#[async_trait]
impl DataSource for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<Assignment>, LoadError> {
        Err(self.error.clone())
    }
}

/// In-memory config store
#[derive(Default)]
pub struct MemoryConfigStore {
    stored: Mutex<Option<FilterState>>,
    error: Option<PersistError>,
}

impl MemoryConfigStore {
    pub fn with_filter(filter: FilterState) -> Self {
        Self {
            stored: Mutex::new(Some(filter)),
            error: None,
        }
    }

    /// A store whose every load and save fails with `error`
    pub fn failing(error: PersistError) -> Self {
        Self {
            stored: Mutex::new(None),
            error: Some(error),
        }
    }

    /// Last saved filter
    pub fn saved(&self) -> Option<FilterState> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<FilterState, PersistError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(self.saved().unwrap_or_default()),
        }
    }

    async fn save(&self, filter: FilterState) -> Result<(), PersistError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(filter);
        Ok(())
    }
}

/// Assert that a specific action was emitted.
///
/// ```ignore
/// let actions = component.handle_event(&event, props);
/// assert_emitted!(actions, Action::Select(1));
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Count how many actions match a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
