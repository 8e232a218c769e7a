//! The assignment list
//!
//! Rows are flattened out of state once per frame ([`RowView::collect`]) so
//! the widget code only deals with strings and flags.

use assignments_core::{AppState, Assignment, EventKind};
use chrono::{DateTime, Local, Utc};
use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use super::Component;

pub const DEADLINE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Lines per row: title, course, deadline
const ROW_HEIGHT: u16 = 3;

pub const ACCENT: Color = Color::Rgb(0x6e, 0xae, 0xde);
pub const HIGHLIGHT: Color = Color::Rgb(0x0b, 0x36, 0x5b);
const MUTED: Color = Color::Rgb(0x77, 0x77, 0x77);
const REASON: Color = Color::Rgb(0xe6, 0x7c, 0x17);

/// `"Submitted before: "`, `"Overdue: "` or `"Due by: "` plus the local
/// deadline. Empty when there is no deadline.
pub fn deadline_text(assignment: &Assignment, now: DateTime<Utc>) -> String {
    let Some(deadline) = assignment.deadline else {
        return String::new();
    };
    let label = if assignment.submitted {
        "Submitted before: "
    } else if deadline < now {
        "Overdue: "
    } else {
        "Due by: "
    };
    format!(
        "{label}{}",
        deadline.with_timezone(&Local).format(DEADLINE_FORMAT)
    )
}

/// Display data for one visible item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView<'a> {
    pub title: &'a str,
    pub course: &'a str,
    pub deadline: String,
    pub submitted: bool,
    pub overdue: bool,
    /// Empty unless the item is hidden
    pub hide_reason: &'static str,
    pub focused: bool,
}

impl<'a> RowView<'a> {
    pub fn collect(state: &'a AppState, now: DateTime<Utc>) -> Vec<RowView<'a>> {
        state
            .visible_items()
            .enumerate()
            .map(|(position, (item, assignment))| RowView {
                title: &assignment.title,
                course: &assignment.course.name,
                deadline: deadline_text(assignment, now),
                submitted: assignment.submitted,
                overdue: assignment.is_expired(now),
                hide_reason: item.hide_reason.map_or("", |reason| reason.label()),
                focused: state.selected == Some(position),
            })
            .collect()
    }

    fn to_item(&self) -> ListItem<'a> {
        let mut course = vec![Span::styled(self.course, Style::default().fg(MUTED))];
        if !self.hide_reason.is_empty() {
            course.push(Span::styled(
                format!("  ({})", self.hide_reason),
                Style::default().fg(REASON),
            ));
        }

        let deadline_style = if self.submitted {
            Style::default().fg(Color::Green)
        } else if self.overdue {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(MUTED)
        };

        let title_style = if self.focused {
            Style::default().fg(ACCENT).bold()
        } else {
            Style::default().bold()
        };

        ListItem::new(Text::from(vec![
            Line::from(Span::styled(self.title, title_style)),
            Line::from(course),
            Line::from(Span::styled(self.deadline.clone(), deadline_style)),
        ]))
    }
}

pub struct AssignmentListProps<'a, A> {
    pub rows: &'a [RowView<'a>],
    pub selected: Option<usize>,
    pub is_focused: bool,
    /// Shown instead of the list when there are no rows
    pub empty_message: &'a str,
    pub on_select: fn(usize) -> A,
}

/// Scrollable list of assignments with keyboard and wheel navigation
#[derive(Default)]
pub struct AssignmentList {
    scroll_offset: usize,
}

impl AssignmentList {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_visible(&mut self, selected: usize, viewport_rows: usize) {
        if viewport_rows == 0 {
            return;
        }

        if selected < self.scroll_offset {
            self.scroll_offset = selected;
        } else if selected >= self.scroll_offset + viewport_rows {
            self.scroll_offset = selected + 1 - viewport_rows;
        }
    }
}

impl<A> Component<A> for AssignmentList {
    type Props<'a> = AssignmentListProps<'a, A>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = A> {
        if !props.is_focused || props.rows.is_empty() {
            return None;
        }

        let last = props.rows.len() - 1;
        let current = props.selected.unwrap_or(0).min(last);

        let target = match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Char('j') | KeyCode::Down => (current + 1).min(last),
                KeyCode::Char('k') | KeyCode::Up => current.saturating_sub(1),
                KeyCode::Char('g') | KeyCode::Home => 0,
                KeyCode::Char('G') | KeyCode::End => last,
                _ => return None,
            },
            EventKind::Scroll { delta, .. } => current.saturating_add_signed(*delta).min(last),
            EventKind::Resize(..) => return None,
        };

        // a missing selection is reported even when the index is unchanged
        (props.selected != Some(target)).then(|| (props.on_select)(target))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if props.rows.is_empty() {
            let message = Paragraph::new(props.empty_message)
                .style(Style::default().fg(MUTED))
                .centered();
            frame.render_widget(message, area);
            return;
        }

        let viewport_rows = (area.height / ROW_HEIGHT) as usize;
        let selected = props.selected.unwrap_or(0).min(props.rows.len() - 1);
        self.ensure_visible(selected, viewport_rows);

        let items: Vec<ListItem> = props.rows.iter().map(RowView::to_item).collect();
        let highlight_symbol = if props.is_focused { "┃ " } else { "  " };
        let list = List::new(items)
            .highlight_symbol(highlight_symbol)
            .highlight_style(Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD))
            .highlight_spacing(ratatui::widgets::HighlightSpacing::Always);

        let mut state = ListState::default().with_selected(props.selected);
        *state.offset_mut() = self.scroll_offset;

        frame.render_stateful_widget(list, area, &mut state);
    }
}
