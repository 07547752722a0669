//! Logging system configuration and initialization
//!
//! This module provides the logging setup with:
//! - Console and/or file output
//! - Configuration file based log level control, overridable by `RUST_LOG`
//! - Structured JSON file logging (optional)
//! - Rotation of the previous run's log file and cleanup of old files
//! - Local-time timestamps

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::Local;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::Directive,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> =
        Mutex::new(Vec::new());
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Timestamps in the machine's local timezone
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Rotate existing log file by renaming it with its timestamp
fn rotate_existing_log_file(log_dir: &Path, log_file_name: &str) -> Result<()> {
    let log_file_path = log_dir.join(log_file_name);
    if !log_file_path.exists() {
        return Ok(());
    }

    let metadata = std::fs::metadata(&log_file_path)
        .map_err(|e| anyhow!("Failed to get log file metadata: {}", e))?;

    let file_time = metadata
        .modified()
        .or_else(|_| metadata.created())
        .unwrap_or_else(|_| std::time::SystemTime::now());

    let datetime: chrono::DateTime<Local> = file_time.into();
    let file_stem = log_file_name.trim_end_matches(".log");
    let timestamped_name = format!("{}.{}.log", file_stem, datetime.format("%Y%m%dT%H%M%S"));
    let timestamped_path = log_dir.join(&timestamped_name);

    std::fs::rename(&log_file_path, &timestamped_path).map_err(|e| {
        anyhow!(
            "Failed to rotate log file {} to {}: {}",
            log_file_path.display(),
            timestamped_path.display(),
            e
        )
    })?;

    Ok(())
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level
///
/// HTTP and HTML-parser internals stay quiet unless the level is `trace`.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::new(&config.level);
    if !config.level.to_lowercase().contains("trace") {
        for (module, level) in &config.module_filters {
            filter = filter.add_directive(parse_directive(&format!("{}={}", module, level))?);
        }
        filter = filter
            .add_directive(parse_directive("h2=warn")?)
            .add_directive(parse_directive("tokio=info")?);
    }

    // Keep our application logs at the requested level
    Ok(filter.add_directive(parse_directive(&format!("grocery_catalog={}", config.level))?))
}

fn parse_directive(directive: &str) -> Result<Directive> {
    directive
        .parse()
        .map_err(|e| anyhow!("Invalid log directive '{}': {}", directive, e))
}

fn console_layer() -> BoxedLayer {
    fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_timer(LocalTimeFormatter)
        .with_target(false)
        .boxed()
}

fn file_layer(log_dir: &Path, config: &LoggingConfig) -> Result<BoxedLayer> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

    rotate_existing_log_file(log_dir, &config.file_name)?;
    if config.auto_cleanup_logs {
        cleanup_old_logs(log_dir, config.max_files)?;
    }

    let file_appender = rolling::never(log_dir, &config.file_name);
    let (file_writer, file_guard) = non_blocking(file_appender);

    // Store the guard globally to prevent it from being dropped
    LOG_GUARDS
        .lock()
        .map_err(|_| anyhow!("Log guard registry poisoned"))?
        .push(file_guard);

    let layer = if config.json_format {
        fmt::Layer::new()
            .json()
            .with_writer(file_writer)
            .with_timer(LocalTimeFormatter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .boxed()
    } else {
        // Minimal formatting: time + level + message
        fmt::Layer::new()
            .with_writer(file_writer)
            .with_timer(LocalTimeFormatter)
            .with_target(false)
            .with_ansi(false)
            .boxed()
    };

    Ok(layer)
}

/// Initialize logging with the given configuration
///
/// Console output goes to stderr so stdout stays free for command output.
///
/// # Environment Variable Override
/// ```bash
/// # Show request details from the HTTP stack
/// RUST_LOG="debug,reqwest=debug,hyper=debug" grocery-catalog bands
/// ```
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let log_dir = config.directory.clone().unwrap_or_else(get_log_directory);

    let layers: Vec<BoxedLayer> = match (config.file_output, config.console_output) {
        (true, true) => vec![file_layer(&log_dir, config)?, console_layer()],
        (true, false) => vec![file_layer(&log_dir, config)?],
        (false, true) => vec![console_layer()],
        (false, false) => return Err(anyhow!("No logging output configured")),
    };

    Registry::default()
        .with(layers)
        .with(build_env_filter(config)?)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log file: {:?}", log_dir.join(&config.file_name));
    }

    Ok(())
}

/// Remove the oldest `.log` files so that at most `max_files` remain
fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let mut log_files = Vec::new();
    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(".log"));

        if path.is_file() && is_log {
            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(max_files as usize) {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove old log file {:?}: {}", path, e);
        } else {
            removed += 1;
        }
    }

    Ok(removed)
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Grocery Catalog System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }
    info!("==========================================");
}
