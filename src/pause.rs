//! "Press any key" pause before the program exits
//!
//! The console window of a double-clicked executable closes as soon as
//! the process ends, so the report is kept on screen until the user
//! acknowledges it. The implementation is chosen per platform at startup.

use std::io::{self, Write};
use std::process::Command;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;

use crate::{DiskSpeedError, Result};

/// Prompt shown while waiting for a key
pub const PAUSE_PROMPT: &str = "Press any key to continue...";

/// Waits for the user to acknowledge the final output
pub trait Acknowledge {
    fn wait(&self) -> Result<()>;
}

/// Runs a shell builtin that performs the pause itself
#[derive(Debug, Clone)]
pub struct ShellPause {
    program: &'static str,
    args: &'static [&'static str],
}

impl ShellPause {
    /// `cmd /C pause`
    pub fn windows() -> Self {
        Self {
            program: "cmd",
            args: &["/C", "pause"],
        }
    }
}

impl Acknowledge for ShellPause {
    fn wait(&self) -> Result<()> {
        let status = Command::new(self.program)
            .args(self.args)
            .status()
            .map_err(|e| {
                DiskSpeedError::ConsoleError(format!("failed to run {}: {}", self.program, e))
            })?;
        if !status.success() {
            log::debug!("{} exited with {}", self.program, status);
        }
        Ok(())
    }
}

/// Reads a single key press from the terminal in raw mode
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPress;

impl Acknowledge for KeyPress {
    fn wait(&self) -> Result<()> {
        print!("{}", PAUSE_PROMPT);
        io::stdout().flush()?;

        terminal::enable_raw_mode()
            .map_err(|e| DiskSpeedError::ConsoleError(format!("cannot enter raw mode: {}", e)))?;
        let outcome = wait_for_key();
        let restored = terminal::disable_raw_mode();
        println!();

        outcome?;
        restored.map_err(|e| DiskSpeedError::ConsoleError(format!("cannot leave raw mode: {}", e)))
    }
}

fn wait_for_key() -> Result<()> {
    loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => return Ok(()),
            Ok(_) => continue,
            Err(e) => {
                return Err(DiskSpeedError::ConsoleError(format!("failed to read key: {}", e)))
            }
        }
    }
}

/// Exits without waiting
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

impl Acknowledge for NoPause {
    fn wait(&self) -> Result<()> {
        Ok(())
    }
}

/// Pick the pause for the running platform, or none when disabled
pub fn platform_default(enabled: bool) -> Box<dyn Acknowledge> {
    if !enabled {
        return Box::new(NoPause);
    }

    if cfg!(windows) {
        Box::new(ShellPause::windows())
    } else {
        Box::new(KeyPress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pause_returns_immediately() {
        assert!(NoPause.wait().is_ok());
        assert!(platform_default(false).wait().is_ok());
    }

    #[test]
    fn test_windows_shell_command() {
        let pause = ShellPause::windows();
        assert_eq!(pause.program, "cmd");
        assert_eq!(pause.args, &["/C", "pause"]);
    }
}
