use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::path::Path;

const DEFAULT_FILTER: &str = "warn";

pub fn open_log_file(path: &Path) -> Result<File, String> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))
}

/// Initialises the global logger. The filter comes from `RUST_LOG`; output goes
/// to `log_file` when given, otherwise stderr.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), String> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));

    if let Some(path) = log_file {
        let file = open_log_file(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| format!("Failed to initialise logging: {}", e))
}
