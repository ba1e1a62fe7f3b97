//! Terminal session for the catalog menu. Raw mode and the alternate screen
//! are held only while the menu runs; the shell gets its terminal back even
//! when drawing or reading input fails.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::debug;

use super::app::App;

type CatalogTerminal = Terminal<CrosstermBackend<Stdout>>;

/// How long to wait for a key before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Run the menu until the user picks Exit or confirms leaving.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut terminal = enter_terminal()?;
    debug!("menu session started");

    let session = event_loop(&mut terminal, app);
    let restored = restore_terminal(&mut terminal);

    debug!(ok = session.is_ok(), "menu session ended");
    session.and(restored)
}

fn enter_terminal() -> Result<CatalogTerminal> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal backend")
}

/// Redraw, then hand every key press to the app. Key releases and repeats
/// reported by some terminals are ignored so one press is one action.
fn event_loop(terminal: &mut CatalogTerminal, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw the menu")?;

        if !event::poll(INPUT_POLL).context("event polling failed")? {
            continue;
        }
        let Event::Key(key) = event::read().context("failed to read input")? else {
            continue;
        };
        if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
            return Ok(());
        }
    }
}

fn restore_terminal(terminal: &mut CatalogTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
