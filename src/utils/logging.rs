//! Diagnostics via `tracing`.
//!
//! Transport failures and rejected attachments are logged here with their
//! detail; the screen only ever shows the short user-facing messages.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Nothing is installed. The full-screen UI owns the terminal.
    Off,
    Stderr,
    /// Appended to this file, without colors.
    File(PathBuf),
}

impl LogTarget {
    /// Where an invocation should log: the `--log` file if given, else
    /// stderr unless the terminal UI is about to take over.
    pub fn choose(log_file: Option<PathBuf>, interactive: bool) -> Self {
        match log_file {
            Some(path) => LogTarget::File(path),
            None if interactive => LogTarget::Off,
            None => LogTarget::Stderr,
        }
    }

    fn default_directive(&self) -> &'static str {
        match self {
            LogTarget::File(_) => "info",
            _ => "warn",
        }
    }
}

fn build_filter(target: &LogTarget, env_value: Option<String>) -> EnvFilter {
    env_value
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(target.default_directive()))
}

pub fn init_tracing(target: LogTarget) -> Result<(), Box<dyn Error>> {
    let filter = build_filter(&target, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    match target {
        LogTarget::Off => Ok(()),
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|err| -> Box<dyn Error> { err })?;
            Ok(())
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| format!("Cannot open log file {}: {err}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|err| -> Box<dyn Error> { err })?;
            Ok(())
        }
    }
}
