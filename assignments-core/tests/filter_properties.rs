//! Properties of the filter pipeline and the state it reads.
//!
//! The first half checks invariants over arbitrary caches and filters with
//! `proptest`; the second half walks through concrete sessions.

use std::sync::Arc;

use assignments_core::testing::{assignment, course, fixed_now, TestHarness};
use assignments_core::{visible, Action, Assignment, Cache, Course, FilterState, HideReason};
use chrono::Duration;
use proptest::prelude::*;

// ──────────────────── strategies ────────────────────

const IDS: [&str; 5] = ["A1", "A2", "A3", "A4", "A5"];
const COURSES: [&str; 3] = ["CS101", "CS302", "CS404"];

fn arb_course() -> impl Strategy<Value = Arc<Course>> {
    prop::sample::select(COURSES.to_vec()).prop_map(course)
}

fn arb_assignment() -> impl Strategy<Value = Assignment> {
    (
        prop::sample::select(IDS.to_vec()),
        arb_course(),
        prop::option::of(-48i64..48),
        any::<bool>(),
    )
        .prop_map(|(id, course, offset, submitted)| {
            let deadline = offset.map(|h| fixed_now() + Duration::hours(h));
            assignment(id, &course, deadline, submitted)
        })
}

fn arb_cache() -> impl Strategy<Value = Vec<Assignment>> {
    prop::collection::vec(arb_assignment(), 0..30)
}

fn arb_filter() -> impl Strategy<Value = FilterState> {
    (
        prop::sample::subsequence(IDS.to_vec(), 0..=IDS.len()),
        prop::sample::subsequence(COURSES.to_vec(), 0..=COURSES.len()),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(ids, courses, include_expired, show_hidden)| FilterState {
            excluded_assignments: ids.into_iter().map(String::from).collect(),
            excluded_courses: courses.into_iter().map(String::from).collect(),
            include_expired,
            show_hidden,
        })
}

fn indices(filter: &FilterState, cache: &[Assignment]) -> Vec<usize> {
    visible(cache, filter, fixed_now())
        .iter()
        .map(|item| item.index)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Two runs on the same inputs agree exactly.
    #[test]
    fn recompute_is_idempotent(cache in arb_cache(), filter in arb_filter()) {
        let first = visible(&cache, &filter, fixed_now());
        let second = visible(&cache, &filter, fixed_now());
        prop_assert_eq!(first, second);
    }

    /// Normal and review mode split the cache into two disjoint halves.
    #[test]
    fn show_hidden_partitions_cache(cache in arb_cache(), filter in arb_filter()) {
        let shown = indices(&FilterState { show_hidden: false, ..filter.clone() }, &cache);
        let hidden = indices(&FilterState { show_hidden: true, ..filter }, &cache);

        let mut all: Vec<usize> = shown.iter().chain(hidden.iter()).copied().collect();
        all.sort_unstable();
        prop_assert_eq!(all, (0..cache.len()).collect::<Vec<_>>());
        prop_assert!(shown.iter().all(|i| !hidden.contains(i)));
    }

    /// Output is a strictly increasing sequence of cache positions.
    #[test]
    fn visible_preserves_cache_order(cache in arb_cache(), filter in arb_filter()) {
        let shown = indices(&filter, &cache);
        prop_assert!(shown.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(shown.iter().all(|&i| i < cache.len()));
    }

    /// Hidden items carry a reason, shown items in normal mode never do.
    #[test]
    fn hide_reason_matches_mode(cache in arb_cache(), filter in arb_filter()) {
        for item in visible(&cache, &filter, fixed_now()) {
            prop_assert_eq!(item.is_hidden(), filter.show_hidden);
        }
    }

    /// Toggling twice restores the filter.
    #[test]
    fn toggles_are_involutions(
        filter in arb_filter(),
        id in prop::sample::select(IDS.to_vec()),
        course_id in prop::sample::select(COURSES.to_vec()),
    ) {
        let mut toggled = filter.clone();
        toggled.toggle_assignment_exclusion(id);
        toggled.toggle_assignment_exclusion(id);
        toggled.toggle_course_exclusion(course_id);
        toggled.toggle_course_exclusion(course_id);
        toggled.toggle_show_hidden();
        toggled.toggle_show_hidden();
        toggled.toggle_include_expired();
        toggled.toggle_include_expired();
        prop_assert_eq!(toggled, filter);
    }

    /// Appending keeps the old entries as a prefix.
    #[test]
    fn append_only_growth(first in arb_cache(), batch in arb_cache()) {
        let mut cache = Cache::new();
        cache.append_batch(first.clone());
        cache.append_batch(batch.clone());

        prop_assert_eq!(&cache.entries()[..first.len()], first.as_slice());
        prop_assert_eq!(&cache.entries()[first.len()..], batch.as_slice());
    }
}

// ──────────────────── sessions ────────────────────

fn two_course_harness() -> TestHarness {
    let now = fixed_now();
    let mut harness = TestHarness::default();
    harness.dispatch(Action::BatchLoaded {
        source: "primary".into(),
        items: vec![
            assignment("A1", &course("CS101"), Some(now - Duration::hours(1)), true),
            assignment("A2", &course("CS302"), Some(now + Duration::hours(1)), false),
        ],
    });
    harness
}

#[test]
fn submitted_overdue_item_stays_visible() {
    let harness = two_course_harness();
    assert_eq!(harness.visible_ids(), vec!["A1", "A2"]);
}

#[test]
fn excluding_by_id_hides_only_that_item() {
    let mut harness = two_course_harness();
    harness.dispatch(Action::ExcludeSelectedAssignment);

    assert_eq!(harness.visible_ids(), vec!["A2"]);

    let reason = harness
        .state
        .cache
        .entries()
        .iter()
        .find(|a| a.id == "A1")
        .and_then(|a| harness.state.filter.hide_reason(a, harness.now));
    assert_eq!(reason.map(HideReason::label), Some("excluded by ID"));
}

#[test]
fn review_mode_lists_only_hidden_items() {
    let mut harness = two_course_harness();
    harness.dispatch(Action::ExcludeSelectedAssignment);
    harness.dispatch(Action::ToggleShowHidden);

    assert_eq!(harness.visible_ids(), vec!["A1"]);
    assert_eq!(
        harness.state.visible[0].hide_reason,
        Some(HideReason::ExcludedById)
    );
}

#[test]
fn expired_items_hidden_until_included() {
    let mut harness = TestHarness::default();
    harness.dispatch(Action::BatchLoaded {
        source: "primary".into(),
        items: vec![assignment(
            "A3",
            &course("CS404"),
            Some(fixed_now() - Duration::hours(1)),
            false,
        )],
    });
    assert!(harness.visible_ids().is_empty());

    harness.dispatch(Action::ToggleIncludeExpired);
    assert_eq!(harness.visible_ids(), vec!["A3"]);
}

#[test]
fn course_exclusion_hides_and_restores_together() {
    let cs302 = course("CS302");
    let mut harness = TestHarness::default();
    harness.dispatch(Action::BatchLoaded {
        source: "primary".into(),
        items: vec![
            assignment("B1", &cs302, None, false),
            assignment("A1", &course("CS101"), None, false),
            assignment("B2", &cs302, None, false),
        ],
    });

    // hide B2 by id first; the course exclusion must hide both anyway
    harness.dispatch(Action::Select(2));
    harness.dispatch(Action::ExcludeSelectedAssignment);
    harness.dispatch(Action::Select(0));
    harness.dispatch(Action::ExcludeSelectedCourse);
    assert_eq!(harness.visible_ids(), vec!["A1"]);

    harness.dispatch(Action::ToggleShowHidden);
    assert_eq!(harness.visible_ids(), vec!["B1", "B2"]);
    harness.dispatch(Action::Select(0));
    harness.dispatch(Action::ExcludeSelectedCourse);
    harness.dispatch(Action::ToggleShowHidden);

    // B2 is still excluded by id
    assert_eq!(harness.visible_ids(), vec!["B1", "A1"]);
    assert!(harness.state.filter.excluded_courses.is_empty());
}

#[test]
fn later_batches_append_without_touching_filter() {
    let mut harness = two_course_harness();
    harness.dispatch(Action::ExcludeSelectedAssignment);
    let filter = harness.state.filter.clone();

    harness.dispatch(Action::BatchLoaded {
        source: "demo".into(),
        items: vec![assignment("A1", &course("CS101"), None, false)],
    });

    assert_eq!(harness.state.filter, filter);
    // the duplicate id is a separate entry, and excluded like the first
    assert_eq!(harness.state.cache.len(), 3);
    assert_eq!(harness.visible_ids(), vec!["A2"]);
}
