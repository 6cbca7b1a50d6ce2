use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode, alternate screen and mouse capture: selection needs every
/// press, drag and release.
pub fn init() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter the alternate screen")?;
    Terminal::new(CrosstermBackend::new(io::stdout())).context("Failed to set up the terminal")
}

/// Undo [`init`]. Every step runs even when an earlier one fails.
pub fn restore() -> Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    raw.context("Failed to disable raw mode")?;
    screen.context("Failed to leave the alternate screen")?;
    Ok(())
}
