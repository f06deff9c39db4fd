//! # Local Logger
//!
//! Routes the `log` facade to two sinks through a `fern` dispatch:
//!
//! - the terminal, timestamp and target in grey, message colored by level;
//! - a plain-text file, truncated at start so it only holds the last run.
//!
//! Both lines share the layout `[YYYY-mm-dd HH:MM:SS][target][LEVEL] message`.

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter};

/// Maps a textual level to a filter; unknown values fall back to `Info`.
pub fn parse_level(log_level: &str) -> LevelFilter {
    match log_level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" | "warning" => LevelFilter::Warn,
        "error" | "fatal" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Opens `log_path` for writing, creating parent directories and truncating
/// any previous content.
pub fn open_truncated(log_path: &Path) -> Result<File> {
    if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
        }
    }
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))
}

fn colorize(level: Level, message: String) -> ColoredString {
    match level {
        Level::Error => message.bright_red(),
        Level::Warn => message.bright_yellow(),
        Level::Info => message.bright_green(),
        Level::Debug => message.bright_white(),
        Level::Trace => message.bright_cyan(),
    }
}

/// Dispatch writing to stdout and to `log_file`.
pub fn build_dispatch(log_file: File, level: LevelFilter) -> fern::Dispatch {
    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}{} {}",
                Local::now()
                    .format("[%Y-%m-%d %H:%M:%S]")
                    .to_string()
                    .truecolor(128, 128, 128),
                format!("[{}][{}]", record.target(), record.level()).truecolor(128, 128, 128),
                colorize(record.level(), message.to_string())
            ))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(log_file);

    fern::Dispatch::new()
        .level(level)
        // Dependencies are noisy at debug level.
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .chain(console)
        .chain(file)
}

/// Installs the global logger. Call once, at the start of `main`.
pub fn setup_logging(log_path: &Path, log_level: &str) -> Result<()> {
    let file = open_truncated(log_path)?;
    build_dispatch(file, parse_level(log_level))
        .apply()
        .context("a global logger is already installed")?;
    Ok(())
}
