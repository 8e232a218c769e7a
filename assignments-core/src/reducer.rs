//! Reducer - the single transition function
//!
//! `reducer(state, action)` applies one action to the state and returns
//! whether a re-render is needed plus the effects to run. It never does
//! I/O and never reads the clock; `Recompute` carries its own instant.

use crate::action::Action;
use crate::effect::{DispatchResult, Effect};
use crate::error::SelectionError;
use crate::filter;
use crate::state::AppState;
use crate::title;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult {
    match action {
        // ===== Loading =====
        Action::LoadRequested(source) => {
            state.pending_loads += 1;
            DispatchResult::changed_with(Effect::Load { source })
        }

        Action::BatchLoaded { source, items } => {
            state.pending_loads = state.pending_loads.saturating_sub(1);
            let count = items.len();
            state.cache.append_batch(items);
            tracing::info!(%source, count, total = state.cache.len(), "batch appended");
            state.set_status(title::batch_loaded(&source, count));
            DispatchResult::changed_with(Effect::Recompute)
        }

        Action::LoadFailed { source, error } => {
            state.pending_loads = state.pending_loads.saturating_sub(1);
            tracing::warn!(%source, %error, "load failed");
            state.set_status(title::load_failed(&source, &error));
            DispatchResult::changed()
        }

        // ===== Filter =====
        Action::ExcludeSelectedAssignment => {
            let Some((_, assignment)) = state.selected_item() else {
                return ignore_without_selection("ExcludeSelectedAssignment");
            };
            let id = assignment.id.clone();
            let name = assignment.title.clone();
            let hidden = state.filter.toggle_assignment_exclusion(&id);
            state.set_status(title::assignment_toggled(&name, hidden));
            DispatchResult::changed_with(Effect::Recompute)
        }

        Action::ExcludeSelectedCourse => {
            let Some((_, assignment)) = state.selected_item() else {
                return ignore_without_selection("ExcludeSelectedCourse");
            };
            let course = assignment.course.clone();
            let hidden = state.filter.toggle_course_exclusion(&course.id);
            state.set_status(title::course_toggled(&course.name, hidden));
            DispatchResult::changed_with(Effect::Recompute)
        }

        Action::ToggleShowHidden => {
            let show_hidden = state.filter.toggle_show_hidden();
            state.refresh_title();
            state.set_status(title::show_hidden_toggled(show_hidden));
            DispatchResult::changed_with(Effect::Recompute)
        }

        Action::ToggleIncludeExpired => {
            let include_expired = state.filter.toggle_include_expired();
            state.refresh_title();
            state.set_status(title::include_expired_toggled(include_expired));
            DispatchResult::changed_with(Effect::Recompute)
        }

        // ===== Persistence =====
        Action::PersistConfiguration => {
            DispatchResult::effect(Effect::Persist(state.filter.clone()))
        }

        Action::PersistSucceeded => {
            state.set_status(title::PERSIST_SUCCEEDED);
            DispatchResult::changed()
        }

        Action::PersistFailed(error) => {
            tracing::warn!(%error, "persist failed");
            state.set_status(title::persist_failed(&error));
            DispatchResult::changed()
        }

        // ===== View =====
        Action::Select(index) => {
            let clamped = match state.visible.len() {
                0 => None,
                len => Some(index.min(len - 1)),
            };
            if clamped == state.selected {
                DispatchResult::unchanged()
            } else {
                state.selected = clamped;
                DispatchResult::changed()
            }
        }

        Action::Recompute(now) => {
            let visible = filter::visible(state.cache.entries(), &state.filter, now);
            state.apply_visible(visible);
            state.refresh_title();
            DispatchResult::changed()
        }

        Action::StatusExpired(id) => {
            if state.clear_status(id) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        // Resize is the renderer's business.
        Action::Resize(..) => DispatchResult::unchanged(),

        Action::Tick => {
            state.tick_count = state.tick_count.wrapping_add(1);
            // the spinner is the only thing that animates
            DispatchResult {
                changed: state.is_loading(),
                effects: vec![],
            }
        }

        // Quit is handled by the runtime loop.
        Action::Quit => DispatchResult::unchanged(),
    }
}

fn ignore_without_selection(action: &'static str) -> DispatchResult {
    tracing::warn!(action, error = %SelectionError::NothingSelected, "ignoring action");
    DispatchResult::unchanged()
}
