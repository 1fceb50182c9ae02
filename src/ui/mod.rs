pub mod app;
pub mod form;
pub mod render;

use crate::config::Config;
use crate::db::repository::TransactionRepository;
use crate::db::storage::KeyValueStorage;
use app::CalendarApp;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use std::io;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runs the interactive calendar until the user quits. Terminal state is
/// restored even when the loop fails.
pub fn run_calendar<S: KeyValueStorage>(
    repository: TransactionRepository<S>,
    config: &Config,
    month: Option<NaiveDate>,
) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("Failed to enable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| format!("Failed to enter alternate screen: {}", e))?;

    let result = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)
            .map_err(|e| format!("Failed to initialize terminal: {}", e))?;

        let mut app = CalendarApp::new(
            repository,
            config,
            Local,
            Local::now().naive_local(),
            Instant::now(),
        );
        if let Some(month) = month {
            app.show_month(month);
        }
        info!("calendar UI started");

        loop {
            app.tick(Instant::now(), Local::now().naive_local());

            terminal
                .draw(|frame| render::draw(frame, &mut app))
                .map_err(|e| format!("Failed to draw terminal UI: {}", e))?;

            if event::poll(POLL_INTERVAL).map_err(|e| format!("Failed to poll input: {}", e))? {
                let event = event::read().map_err(|e| format!("Failed to read input: {}", e))?;
                if let Event::Key(key) = event {
                    if app.handle_key(key) {
                        break;
                    }
                }
            }
        }

        info!("calendar UI closed");
        Ok(())
    })();

    disable_raw_mode().map_err(|e| format!("Failed to disable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)
        .map_err(|e| format!("Failed to leave alternate screen: {}", e))?;

    result
}
