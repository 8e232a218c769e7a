//! ratatui implementation of the runtime's [`Renderer`]

use std::io;

use assignments_core::{Action, AppState, EventKind, Keybindings, Renderer};
use chrono::{DateTime, Utc};
use ratatui::{backend::Backend, layout::Rect, Terminal};

use crate::components::{AppView, AppViewProps, Component};

pub struct TerminalUi<B: Backend> {
    terminal: Terminal<B>,
    view: AppView,
    keybindings: Keybindings,
    clock: fn() -> DateTime<Utc>,
}

impl<B: Backend> TerminalUi<B> {
    /// `keybindings` should be the set the runtime resolves with, so the
    /// help bar matches.
    pub fn new(terminal: Terminal<B>, keybindings: Keybindings) -> Self {
        Self {
            terminal,
            view: AppView::new(),
            keybindings,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> Renderer for TerminalUi<B> {
    fn draw(&mut self, state: &AppState) -> io::Result<()> {
        let view = &mut self.view;
        let props = AppViewProps {
            state,
            keybindings: &self.keybindings,
            now: (self.clock)(),
            is_focused: true,
        };
        self.terminal
            .draw(|frame| view.render(frame, frame.area(), props))?;
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        if let Err(error) = self.terminal.resize(Rect::new(0, 0, width, height)) {
            tracing::warn!(%error, width, height, "terminal resize failed");
        }
    }

    fn handle_event(&mut self, event: &EventKind, state: &AppState) -> Vec<Action> {
        let props = AppViewProps {
            state,
            keybindings: &self.keybindings,
            now: (self.clock)(),
            is_focused: true,
        };
        self.view.handle_event(event, props).into_iter().collect()
    }
}
