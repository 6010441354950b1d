//! Raw-mode/alternate-screen lifetime for the gallery.

use std::fmt::Display;
use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::error;

pub type GalleryTerminal = Terminal<CrosstermBackend<Stdout>>;

static PANIC_HOOK: Once = Once::new();

/// Owns the terminal while the gallery runs
///
/// The screen is handed back on [`restore`](Self::restore), on drop, and from
/// the panic hook, whichever comes first.
pub struct TerminalManager {
    terminal: GalleryTerminal,
    active: bool,
}

impl TerminalManager {
    pub fn new() -> Result<Self> {
        PANIC_HOOK.call_once(install_panic_hook);

        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e).context("Failed to enter alternate screen");
        }

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal, active: true })
    }

    pub fn terminal_mut(&mut self) -> &mut GalleryTerminal {
        &mut self.terminal
    }

    /// Leave the alternate screen, reporting failures
    pub fn restore(mut self) -> Result<()> {
        self.leave()
    }

    fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TerminalManager {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

/// Leave raw mode before the default hook prints, so the panic message is readable
///
/// The panic is also logged: while the gallery runs, the log file is the
/// only lasting record of it.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        log_panic(info);
        previous(info);
    }));
}

fn log_panic(info: &dyn Display) {
    error!(panic = %info, "Gallery crashed");
}
