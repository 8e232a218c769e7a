//! Actions: every message the dispatcher can receive
//!
//! Intent actions come from key bindings and the renderer. Result actions
//! (`BatchLoaded`, `LoadFailed`, `PersistSucceeded`, `PersistFailed`) are
//! sent back by background tasks. `Recompute` and `StatusExpired` are only
//! ever produced by the runtime.

use chrono::{DateTime, Utc};

use crate::error::{LoadError, PersistError};
use crate::model::Assignment;

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    // ===== Loading =====
    /// Intent: start a load from the named data source
    LoadRequested(String),

    /// Result: a source delivered a batch
    BatchLoaded {
        source: String,
        items: Vec<Assignment>,
    },

    /// Result: a source failed
    LoadFailed { source: String, error: LoadError },

    // ===== Filter =====
    ExcludeSelectedAssignment,
    ExcludeSelectedCourse,
    ToggleShowHidden,
    ToggleIncludeExpired,

    // ===== Persistence =====
    PersistConfiguration,
    PersistSucceeded,
    PersistFailed(PersistError),

    // ===== View =====
    /// The renderer moved its cursor to this visible position
    Select(usize),

    /// Run the filter pipeline against the given instant
    Recompute(DateTime<Utc>),

    /// The status message with this id has outlived its lifetime
    StatusExpired(u64),

    /// Terminal size changed; handled by the renderer
    Resize(u16, u16),

    /// Periodic tick for the loading spinner
    Tick,

    Quit,
}

impl Action {
    /// Variant name for logging and filtering
    pub fn name(&self) -> &'static str {
        match self {
            Action::LoadRequested(_) => "LoadRequested",
            Action::BatchLoaded { .. } => "BatchLoaded",
            Action::LoadFailed { .. } => "LoadFailed",
            Action::ExcludeSelectedAssignment => "ExcludeSelectedAssignment",
            Action::ExcludeSelectedCourse => "ExcludeSelectedCourse",
            Action::ToggleShowHidden => "ToggleShowHidden",
            Action::ToggleIncludeExpired => "ToggleIncludeExpired",
            Action::PersistConfiguration => "PersistConfiguration",
            Action::PersistSucceeded => "PersistSucceeded",
            Action::PersistFailed(_) => "PersistFailed",
            Action::Select(_) => "Select",
            Action::Recompute(_) => "Recompute",
            Action::StatusExpired(_) => "StatusExpired",
            Action::Resize(..) => "Resize",
            Action::Tick => "Tick",
            Action::Quit => "Quit",
        }
    }

    /// Short description for logs; batches are summarized by size
    pub fn summary(&self) -> String {
        match self {
            Action::BatchLoaded { source, items } => {
                format!("BatchLoaded {{ source: {source:?}, items: {} }}", items.len())
            }
            Action::LoadFailed { source, error } => {
                format!("LoadFailed {{ source: {source:?}, error: {error} }}")
            }
            _ => format!("{self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assignment, course};

    #[test]
    fn test_summary_counts_batch_items() {
        let cs = course("CS101");
        let action = Action::BatchLoaded {
            source: "demo".into(),
            items: vec![
                assignment("A1", &cs, None, false),
                assignment("A2", &cs, None, false),
            ],
        };
        assert_eq!(action.name(), "BatchLoaded");
        assert_eq!(action.summary(), "BatchLoaded { source: \"demo\", items: 2 }");
    }

    #[test]
    fn test_summary_defaults_to_debug() {
        assert_eq!(Action::Resize(80, 24).summary(), "Resize(80, 24)");
    }
}
