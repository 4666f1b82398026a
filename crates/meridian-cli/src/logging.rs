//! Subscriber installation for the `meridian` binary.

use std::env;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("pretty") {
            Some(LogFormat::Pretty)
        } else if value.eq_ignore_ascii_case("json") {
            Some(LogFormat::Json)
        } else {
            None
        }
    }
}

/// Build the level filter from `--log-level`, then `MERIDIAN_TRACE`; `off` by default.
pub(crate) fn level_filter(level: Option<&str>) -> Result<EnvFilter, Box<dyn Error>> {
    let level_value = level
        .map(str::to_string)
        .or_else(|| env::var("MERIDIAN_TRACE").ok())
        .unwrap_or_else(|| "off".to_string());

    if level_value.eq_ignore_ascii_case("off") {
        return Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()));
    }
    EnvFilter::try_new(&level_value).map_err(|err| format!("Invalid log filter: {err}").into())
}

fn open_log_file(path: &str) -> Result<File, Box<dyn Error>> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| format!("Failed to open log file: {err}").into())
}

fn map_init_err<E: std::fmt::Display>(err: E) -> Box<dyn Error> {
    format!("Failed to initialize logging: {err}").into()
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber is already set.
pub(crate) fn init_logging(level: Option<&str>) -> Result<bool, Box<dyn Error>> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let filter = level_filter(level)?;
    let format_value = env::var("MERIDIAN_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let Some(format) = LogFormat::parse(&format_value) else {
        return Err("Invalid MERIDIAN_LOG_FORMAT (expected 'json' or 'pretty')".into());
    };
    let log_file = env::var("MERIDIAN_LOG_FILE").ok();

    match format {
        LogFormat::Json => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .json();
            let base = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer);
            if let Some(path) = log_file {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(open_log_file(&path)?)
                    .with_ansi(false)
                    .json();
                base.with(file_layer).try_init().map_err(map_init_err)?;
            } else {
                base.try_init().map_err(map_init_err)?;
            }
        }
        LogFormat::Pretty => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .pretty();
            let base = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer);
            if let Some(path) = log_file {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(open_log_file(&path)?)
                    .with_ansi(false)
                    .pretty();
                base.with(file_layer).try_init().map_err(map_init_err)?;
            } else {
                base.try_init().map_err(map_init_err)?;
            }
        }
    }

    Ok(true)
}
