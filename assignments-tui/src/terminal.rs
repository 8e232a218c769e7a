//! Raw mode and alternate screen, restored on drop

use std::io::{self, Write};

use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Holds the terminal in full-screen mode until dropped.
///
/// Dropping restores the terminal even when setup failed halfway or the
/// caller returns early with an error.
#[must_use = "the terminal is restored as soon as the guard is dropped"]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = Self { _private: () };
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(error) = disable_raw_mode() {
            tracing::warn!(%error, "could not leave raw mode");
        }
        if let Err(error) = leave_screen(&mut io::stdout()) {
            tracing::warn!(%error, "could not leave alternate screen");
        }
    }
}

/// Leave the alternate screen, stop mouse capture and show the cursor.
pub fn leave_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, LeaveAlternateScreen, DisableMouseCapture, Show)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_leave_screen_sequences() {
        let mut out = Vec::new();
        leave_screen(&mut out).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?1049l"));
        assert!(written.contains("\x1b[?25h"));
    }
}
