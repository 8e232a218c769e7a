//! Transient status line
//!
//! Shows whatever status the state holds; the runtime clears it once its
//! lifetime is over.

use assignments_core::{Action, StatusMessage};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use super::Component;

pub struct StatusBarProps<'a> {
    pub status: Option<&'a StatusMessage>,
}

#[derive(Default)]
pub struct StatusBar;

impl StatusBar {
    pub fn new() -> Self {
        Self
    }
}

impl Component<Action> for StatusBar {
    type Props<'a> = StatusBarProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if let Some(status) = props.status {
            let line = Paragraph::new(format!(" {}", status.text));
            frame.render_widget(line.style(Style::default().fg(Color::Yellow)), area);
        }
    }
}
