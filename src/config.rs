use crate::cli::Cli;
use crate::operations::search::DailyOrder;
use std::path::PathBuf;
use std::time::Duration;

/// Log file used while the calendar UI owns the terminal.
pub const DEFAULT_UI_LOG_FILE: &str = "fincal.log";

/// Settings shared by the calendar UI and the command handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub storage_key: String,
    pub currency: String,
    pub daily_order: DailyOrder,
    pub splash: Duration,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            db_path: cli.db_path.clone(),
            storage_key: cli.storage_key.clone(),
            currency: cli.currency.clone(),
            daily_order: cli.daily_order,
            splash: Duration::from_millis(cli.splash_ms),
            log_file: cli.log_file.clone(),
        }
    }

    /// Where log output goes. `None` means stderr, which is only usable when
    /// the terminal UI is not running.
    pub fn log_destination(&self, interactive: bool) -> Option<PathBuf> {
        match (&self.log_file, interactive) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(PathBuf::from(DEFAULT_UI_LOG_FILE)),
            (None, false) => None,
        }
    }
}
