//! Application state - single source of truth
//!
//! Only the reducer mutates state. Renderers receive `&AppState`.

use std::time::Duration;

use crate::filter::{FilterState, VisibleItem};
use crate::model::Assignment;
use crate::title::compose_title;

/// How long a status message is meant to stay on screen
pub const STATUS_LIFETIME: Duration = Duration::from_secs(2);

/// Append-only accumulation of every loaded assignment
///
/// Insertion order is display order. Entries are never removed or
/// reordered, and duplicate ids across batches stay distinct.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cache {
    entries: Vec<Assignment>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_batch(&mut self, items: impl IntoIterator<Item = Assignment>) {
        self.entries.extend(items);
    }

    pub fn entries(&self) -> &[Assignment] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Assignment> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A transient message describing the latest action
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    /// Increases with every new message, so renderers can tell two
    /// identical texts apart
    pub id: u64,
    pub text: String,
    pub lifetime: Duration,
}

/// Everything the renderer needs
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: Cache,
    pub filter: FilterState,

    /// Output of the last pipeline run
    pub visible: Vec<VisibleItem>,

    /// Position in `visible`, reported by the renderer
    pub selected: Option<usize>,

    pub title: String,
    pub status: Option<StatusMessage>,

    /// Load tasks started but not yet reported back
    pub pending_loads: usize,

    /// Animation frame counter (for the loading spinner)
    pub tick_count: u32,

    /// Lifetime given to new status messages
    pub status_lifetime: Duration,

    status_seq: u64,
}

impl AppState {
    /// Empty cache, given filter.
    pub fn new(filter: FilterState) -> Self {
        let title = compose_title(&filter);
        Self {
            cache: Cache::new(),
            filter,
            visible: Vec::new(),
            selected: None,
            title,
            status: None,
            pending_loads: 0,
            tick_count: 0,
            status_lifetime: STATUS_LIFETIME,
            status_seq: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }

    /// The selected visible item together with its assignment
    pub fn selected_item(&self) -> Option<(&VisibleItem, &Assignment)> {
        let item = self.visible.get(self.selected?)?;
        let assignment = self.cache.get(item.index)?;
        Some((item, assignment))
    }

    /// Visible items paired with their cached assignments, in display order
    pub fn visible_items(&self) -> impl Iterator<Item = (&VisibleItem, &Assignment)> + '_ {
        self.visible
            .iter()
            .filter_map(|item| self.cache.get(item.index).map(|a| (item, a)))
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_seq += 1;
        self.status = Some(StatusMessage {
            id: self.status_seq,
            text: text.into(),
            lifetime: self.status_lifetime,
        });
    }

    /// Drop the status if it is still message `id`. Returns whether it was.
    pub fn clear_status(&mut self, id: u64) -> bool {
        if self.status.as_ref().is_some_and(|status| status.id == id) {
            self.status = None;
            true
        } else {
            false
        }
    }

    /// Replace the visible sequence, keeping the selection inside it.
    pub fn apply_visible(&mut self, visible: Vec<VisibleItem>) {
        self.visible = visible;
        self.selected = match self.visible.len() {
            0 => None,
            len => Some(self.selected.unwrap_or(0).min(len - 1)),
        };
    }

    pub fn refresh_title(&mut self) {
        self.title = compose_title(&self.filter);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assignment, course};

    fn item(index: usize) -> VisibleItem {
        VisibleItem {
            index,
            hide_reason: None,
        }
    }

    #[test]
    fn test_append_batch_keeps_existing_entries() {
        let cs = course("CS101");
        let mut cache = Cache::new();
        cache.append_batch(vec![assignment("A1", &cs, None, false)]);
        let before = cache.entries().to_vec();

        cache.append_batch(vec![
            assignment("A1", &cs, None, true),
            assignment("A2", &cs, None, false),
        ]);

        assert_eq!(cache.len(), 3);
        assert_eq!(&cache.entries()[..1], before.as_slice());
        // duplicate ids are separate entries
        assert_eq!(cache.entries()[1].id, "A1");
        assert!(cache.entries()[1].submitted);
    }

    #[test]
    fn test_apply_visible_clamps_selection() {
        let mut state = AppState::default();
        state.apply_visible(vec![item(0), item(1), item(2)]);
        assert_eq!(state.selected, Some(0));

        state.selected = Some(2);
        state.apply_visible(vec![item(0)]);
        assert_eq!(state.selected, Some(0));

        state.apply_visible(vec![]);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_set_status_bumps_id() {
        let mut state = AppState::default();
        state.set_status("one");
        state.set_status("one");
        let status = state.status.as_ref().unwrap();
        assert_eq!(status.id, 2);
        assert_eq!(status.lifetime, STATUS_LIFETIME);
    }

    #[test]
    fn test_new_composes_title() {
        let filter = FilterState {
            show_hidden: true,
            ..FilterState::default()
        };
        assert_eq!(AppState::new(filter).title, "Hidden assignments");
    }

    #[test]
    fn test_selected_item_resolves_cache_entry() {
        let cs = course("CS101");
        let mut state = AppState::default();
        state.cache.append_batch(vec![
            assignment("A1", &cs, None, false),
            assignment("A2", &cs, None, false),
        ]);
        state.apply_visible(vec![item(1)]);

        let (_, selected) = state.selected_item().unwrap();
        assert_eq!(selected.id, "A2");
    }
}
