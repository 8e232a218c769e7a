//! Filter state and the visibility pipeline
//!
//! [`visible`] is a pure function of the cache, the filter and the current
//! time. It has no memory between calls, so running it twice on the same
//! inputs yields the same sequence.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::model::Assignment;

/// User-controlled visibility preferences
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub excluded_assignments: BTreeSet<String>,
    pub excluded_courses: BTreeSet<String>,
    pub include_expired: bool,
    /// Review mode: show only the items that are currently hidden
    pub show_hidden: bool,
}

impl FilterState {
    /// Flip membership of an assignment id. Returns `true` if the id is now excluded.
    pub fn toggle_assignment_exclusion(&mut self, id: &str) -> bool {
        toggle_member(&mut self.excluded_assignments, id)
    }

    /// Flip membership of a course id. Returns `true` if the course is now excluded.
    pub fn toggle_course_exclusion(&mut self, id: &str) -> bool {
        toggle_member(&mut self.excluded_courses, id)
    }

    pub fn toggle_show_hidden(&mut self) -> bool {
        self.show_hidden = !self.show_hidden;
        self.show_hidden
    }

    pub fn toggle_include_expired(&mut self) -> bool {
        self.include_expired = !self.include_expired;
        self.include_expired
    }

    /// Why `assignment` is hidden under this filter, if it is.
    ///
    /// Conditions are checked in precedence order: id exclusion, then course
    /// exclusion, then expiration.
    pub fn hide_reason(&self, assignment: &Assignment, now: DateTime<Utc>) -> Option<HideReason> {
        if self.excluded_assignments.contains(&assignment.id) {
            Some(HideReason::ExcludedById)
        } else if self.excluded_courses.contains(&assignment.course.id) {
            Some(HideReason::ExcludedByCourse)
        } else if !self.include_expired && assignment.is_expired(now) {
            Some(HideReason::Expired)
        } else {
            None
        }
    }
}

fn toggle_member(set: &mut BTreeSet<String>, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_owned());
        true
    }
}

/// The first condition that hides an item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HideReason {
    ExcludedById,
    ExcludedByCourse,
    Expired,
}

impl HideReason {
    pub fn label(self) -> &'static str {
        match self {
            HideReason::ExcludedById => "excluded by ID",
            HideReason::ExcludedByCourse => "excluded by course",
            HideReason::Expired => "expired",
        }
    }
}

impl fmt::Display for HideReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the visible sequence
///
/// Points back into the cache by index; the hide reason is pipeline output
/// and is recomputed on every run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleItem {
    pub index: usize,
    pub hide_reason: Option<HideReason>,
}

impl VisibleItem {
    pub fn is_hidden(&self) -> bool {
        self.hide_reason.is_some()
    }
}

/// Compute the visible subsequence of `cache`.
///
/// An item is included iff its hidden-ness equals `filter.show_hidden`, so
/// review mode lists only hidden items rather than everything.
pub fn visible(cache: &[Assignment], filter: &FilterState, now: DateTime<Utc>) -> Vec<VisibleItem> {
    cache
        .iter()
        .enumerate()
        .filter_map(|(index, assignment)| {
            let hide_reason = filter.hide_reason(assignment, now);
            (hide_reason.is_some() == filter.show_hidden).then_some(VisibleItem { index, hide_reason })
        })
        .collect()
}
