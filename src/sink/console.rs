//! Colored console sink backed by `termcolor`.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::{ConsoleColor, ConsoleSink};
use crate::error::SinkError;

/// StandardConsole: writes colored lines to stdout for CLI and test runner use.
pub struct StandardConsole {
    stream: Mutex<StandardStream>,
}

impl StandardConsole {
    /// Colors only when stdout is a terminal.
    pub fn new() -> Self {
        let choice = if atty::is(atty::Stream::Stdout) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::with_choice(choice)
    }

    pub fn with_choice(choice: ColorChoice) -> Self {
        Self {
            stream: Mutex::new(StandardStream::stdout(choice)),
        }
    }
}

impl Default for StandardConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink for StandardConsole {
    fn print(&self, color: ConsoleColor, text: &str) -> Result<(), SinkError> {
        let mut stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        stream.set_color(ColorSpec::new().set_fg(Some(color.into())))?;
        writeln!(stream, "{}", text)?;
        stream.reset()?;
        Ok(())
    }
}
