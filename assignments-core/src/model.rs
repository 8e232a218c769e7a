//! Assignment records as delivered by a data source

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// A course that assignments belong to
///
/// Hiding a course hides every assignment that references it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Course {
    pub id: String,
    pub name: String,
    /// Where the course lives upstream; opaque to the controller
    pub url: String,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A single assignment
///
/// The course is shared between all assignments of one batch, so it is
/// reference counted rather than copied per record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Unique within a load batch only
    pub id: String,
    pub title: String,
    /// `None` when the assignment has no deadline
    pub deadline: Option<DateTime<Utc>>,
    pub submitted: bool,
    pub course: Arc<Course>,
}

impl Assignment {
    /// Whether the deadline passed without a submission.
    ///
    /// Submitted work never counts as expired, and neither does an
    /// assignment without a deadline.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.submitted && self.deadline.is_some_and(|deadline| deadline < now)
    }
}
