//! Render test utilities
//!
//! ```ignore
//! let mut render = RenderHarness::new(60, 20);
//! let output = render.render_to_string_plain(|frame| {
//!     view.render(frame, frame.area(), props);
//! });
//! assert!(output.contains("Assignments"));
//! ```

use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Frame, Terminal};

/// Renders into an in-memory buffer of fixed size
pub struct RenderHarness {
    terminal: Terminal<TestBackend>,
}

impl RenderHarness {
    /// # Panics
    ///
    /// Panics if the test terminal cannot be created.
    pub fn new(width: u16, height: u16) -> Self {
        let terminal = Terminal::new(TestBackend::new(width, height))
            .unwrap_or_else(|e| panic!("test terminal: {e}"));
        Self { terminal }
    }

    /// Draw one frame and return the resulting buffer.
    pub fn render(&mut self, draw: impl FnOnce(&mut Frame)) -> &Buffer {
        self.terminal
            .draw(draw)
            .unwrap_or_else(|e| panic!("test draw: {e}"));
        self.terminal.backend().buffer()
    }

    /// Draw one frame and return its text, one line per row, trailing
    /// spaces trimmed.
    pub fn render_to_string_plain(&mut self, draw: impl FnOnce(&mut Frame)) -> String {
        buffer_to_string_plain(self.render(draw))
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<TestBackend> {
        &mut self.terminal
    }
}

pub fn buffer_to_string_plain(buffer: &Buffer) -> String {
    buffer_rect_to_string_plain(buffer, buffer.area)
}

/// Text of one region of a buffer
pub fn buffer_rect_to_string_plain(buffer: &Buffer, rect: Rect) -> String {
    let area = rect.intersection(buffer.area);
    (area.top()..area.bottom())
        .map(|y| {
            let line: String = (area.left()..area.right())
                .map(|x| buffer[(x, y)].symbol())
                .collect();
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    #[test]
    fn test_render_to_string() {
        let mut render = RenderHarness::new(10, 2);
        let output = render.render_to_string_plain(|frame| {
            frame.render_widget(Paragraph::new("hi\nthere"), frame.area());
        });
        assert_eq!(output, "hi\nthere");
    }

    #[test]
    fn test_rect_region() {
        let mut render = RenderHarness::new(10, 2);
        let buffer = render.render(|frame| {
            frame.render_widget(Paragraph::new("abcdef"), frame.area());
        });
        assert_eq!(buffer_rect_to_string_plain(buffer, Rect::new(2, 0, 3, 1)), "cde");
    }
}
