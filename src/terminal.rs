//! Scoped raw-mode handling for the real terminal.
use crossterm::{ExecutableCommand, terminal};
use std::io;
use std::io::Write;

/// Guard returned by [`set_terminal_raw`], leaves raw mode when dropped so
/// the terminal is restored on every exit path.
#[must_use]
pub struct RawLock {}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Error resetting terminal {e}");
        }
    }
}

fn handle_set_raw_error(e: &io::Error) {
    eprintln!("Could not set terminal to raw mode: {e}");
}

/// Set terminal to raw in best-effort mode, only log on failure, since it does not work for
/// cargo doc tests and disabling does not work because of a
/// [rust issue](https://github.com/rust-lang/rust/issues/67295).
pub fn set_terminal_raw(mut stdout: impl Write) -> RawLock {
    if let Err(e) =
        terminal::enable_raw_mode().and_then(|()| stdout.execute(terminal::EnableLineWrap).map(|_| ()))
    {
        handle_set_raw_error(&e);
    }
    RawLock {}
}
