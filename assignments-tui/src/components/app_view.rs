//! Whole-screen view: titled frame around the list, status line and help bar

use assignments_core::{Action, AppState, EventKind, Keybindings};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    widgets::{Block, Borders},
    Frame,
};

use super::assignment_list::{ACCENT, HIGHLIGHT};
use super::{
    AssignmentList, AssignmentListProps, Component, HelpBar, HelpBarProps, RowView, StatusBar,
    StatusBarProps,
};

pub const SPINNERS: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub struct AppViewProps<'a> {
    pub state: &'a AppState,
    pub keybindings: &'a Keybindings,
    /// Wall clock for deadline labels
    pub now: DateTime<Utc>,
    pub is_focused: bool,
}

#[derive(Default)]
pub struct AppView {
    list: AssignmentList,
    status: StatusBar,
}

impl AppView {
    pub fn new() -> Self {
        Self::default()
    }

    fn title(state: &AppState) -> String {
        if state.is_loading() {
            let spinner = SPINNERS[(state.tick_count as usize / 2) % SPINNERS.len()];
            format!(" {} {spinner} ", state.title)
        } else {
            format!(" {} ", state.title)
        }
    }

    fn empty_message(state: &AppState) -> &'static str {
        if state.is_loading() {
            "Loading assignments…"
        } else if state.filter.show_hidden {
            "No hidden assignments"
        } else {
            "No assignments to show"
        }
    }
}

impl Component<Action> for AppView {
    type Props<'a> = AppViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        let rows = RowView::collect(props.state, props.now);
        let list_props = AssignmentListProps {
            rows: &rows,
            selected: props.state.selected,
            is_focused: props.is_focused,
            empty_message: "",
            on_select: Action::Select,
        };
        self.list
            .handle_event(event, list_props)
            .into_iter()
            .collect::<Vec<_>>()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;

        let outer = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(HIGHLIGHT))
            .title(Self::title(state))
            .title_style(Style::default().fg(ACCENT).bold())
            .title_alignment(Alignment::Center);
        frame.render_widget(outer.clone(), area);
        let inner = outer.inner(area);

        let chunks = Layout::vertical([
            Constraint::Min(1),    // list
            Constraint::Length(1), // status
            Constraint::Length(1), // help
        ])
        .split(inner);

        let rows = RowView::collect(state, props.now);
        self.list.render(
            frame,
            chunks[0],
            AssignmentListProps {
                rows: &rows,
                selected: state.selected,
                is_focused: props.is_focused,
                empty_message: Self::empty_message(state),
                on_select: Action::Select,
            },
        );

        self.status.render(
            frame,
            chunks[1],
            StatusBarProps {
                status: state.status.as_ref(),
            },
        );

        HelpBar.render(
            frame,
            chunks[2],
            HelpBarProps {
                keybindings: props.keybindings,
            },
        );
    }
}
