//! Effects declared by the reducer
//!
//! The reducer never performs I/O or reads the clock. It returns a
//! [`DispatchResult`] carrying the effects, and the runtime carries them out.

use crate::filter::FilterState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the full, unfiltered set from the named source
    Load { source: String },
    /// Write a snapshot of the filter to the config store
    Persist(FilterState),
    /// Re-run the filter pipeline at the current time
    Recompute,
}

/// Result of dispatching an action: state change indicator plus effects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    pub changed: bool,
    pub effects: Vec<Effect>,
}

impl DispatchResult {
    #[inline]
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            effects: vec![],
        }
    }

    #[inline]
    pub fn changed() -> Self {
        Self {
            changed: true,
            effects: vec![],
        }
    }

    /// A single effect, no state change
    #[inline]
    pub fn effect(effect: Effect) -> Self {
        Self {
            changed: false,
            effects: vec![effect],
        }
    }

    #[inline]
    pub fn changed_with(effect: Effect) -> Self {
        Self {
            changed: true,
            effects: vec![effect],
        }
    }

    #[inline]
    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[inline]
    pub fn mark_changed(mut self) -> Self {
        self.changed = true;
        self
    }

    #[inline]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}
