use crossterm::event::{KeyModifiers, poll, read};
use std::io;
use std::time::Duration;

/// Providing keyboard input independent of an implementation.
///
/// The memory subsystem polls this when the keyboard status register is read,
/// test doubles script their input instead of touching a real terminal.
pub trait KeyboardInputProvider {
    /// Checks if input is available, does not block.
    fn check_input_available(&mut self) -> io::Result<bool>;
    /// Takes the pending input if `check_input_available` returned `true`, panics otherwise.
    fn take_input_character(&mut self) -> char;
    /// True if CTRL-C was observed while polling.
    fn is_interrupted(&self) -> bool;
}

/// Polls the real terminal through the crossterm event stream.
///
/// Requires the terminal to be in raw mode, see [`crate::terminal::set_terminal_raw`].
/// CTRL-C does not raise a signal in raw mode, it arrives as a key event here
/// and is reported through `is_interrupted`.
pub struct TerminalInputProvider {
    available_char: Option<char>,
    is_interrupted: bool,
}

impl TerminalInputProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            available_char: None,
            is_interrupted: false,
        }
    }
}

impl Default for TerminalInputProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardInputProvider for TerminalInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if self.available_char.is_some() {
            return Ok(true);
        }
        if poll(Duration::from_secs(0))?
            && let Some(event) = read()?.as_key_press_event()
            && let Some(c) = event.code.as_char()
        {
            if c == 'c' && event.modifiers == KeyModifiers::CONTROL {
                self.is_interrupted = true;
            } else {
                self.available_char = Some(c);
                return Ok(true);
            }
        }
        Ok(false)
    }
    fn take_input_character(&mut self) -> char {
        self.available_char
            .take()
            .unwrap_or_else(|| panic!("No input available"))
    }
    fn is_interrupted(&self) -> bool {
        self.is_interrupted
    }
}
