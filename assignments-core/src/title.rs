//! List title and transient status text

use crate::filter::FilterState;

pub const BASE_TITLE: &str = "Assignments";
pub const HIDDEN_TITLE: &str = "Hidden assignments";
pub const EXPIRED_QUALIFIER: &str = " (expired included)";

/// Derive the list title from the filter.
pub fn compose_title(filter: &FilterState) -> String {
    let base = if filter.show_hidden {
        HIDDEN_TITLE
    } else {
        BASE_TITLE
    };
    if filter.include_expired {
        format!("{base}{EXPIRED_QUALIFIER}")
    } else {
        base.to_string()
    }
}

pub fn assignment_toggled(title: &str, hidden: bool) -> String {
    if hidden {
        format!("Hid assignment \"{title}\"")
    } else {
        format!("Restored assignment \"{title}\"")
    }
}

pub fn course_toggled(name: &str, hidden: bool) -> String {
    if hidden {
        format!("Hid course \"{name}\"")
    } else {
        format!("Restored course \"{name}\"")
    }
}

pub fn show_hidden_toggled(show_hidden: bool) -> String {
    if show_hidden {
        "Reviewing hidden assignments".to_string()
    } else {
        "Showing visible assignments".to_string()
    }
}

pub fn include_expired_toggled(include_expired: bool) -> String {
    if include_expired {
        "Including expired assignments".to_string()
    } else {
        "Hiding expired assignments".to_string()
    }
}

pub fn batch_loaded(source: &str, count: usize) -> String {
    match count {
        1 => format!("Loaded 1 assignment from {source}"),
        n => format!("Loaded {n} assignments from {source}"),
    }
}

pub fn load_failed(source: &str, error: &impl std::fmt::Display) -> String {
    format!("Loading from {source} failed: {error}")
}

pub const PERSIST_SUCCEEDED: &str = "Configuration saved";

pub fn persist_failed(error: &impl std::fmt::Display) -> String {
    format!("Saving configuration failed: {error}")
}
