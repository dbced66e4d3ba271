pub mod app;
pub mod colors;
pub mod list;
pub mod search;
pub mod ui;

use crate::api::MovieSource;
use crate::config::AppConfig;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;

/// Entry point: take over the terminal and run the search UI
pub fn run(config: &AppConfig, source: Arc<dyn MovieSource>) -> crate::Result<()> {
    let mut app = app::App::new(config, source)?;
    let _panics = crate::logging::PanicLogGuard::install();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
