//! Rolling Logger
//!
//! `log` backend that keeps the last N formatted records in memory and
//! echoes every record to the console (the browser console on wasm,
//! stderr elsewhere).

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::OnceLock;
use thiserror::Error;

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggerError {
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
}

/// Circular buffer of formatted log lines
#[derive(Debug)]
pub struct RollingLogger {
    app_name: String,
    capacity: usize,
    level: LevelFilter,
    lines: Mutex<VecDeque<String>>,
}

impl RollingLogger {
    pub fn new(capacity: usize, app_name: impl Into<String>, level: LevelFilter) -> Self {
        let capacity = capacity.max(1);
        Self {
            app_name: app_name.into(),
            capacity,
            level,
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Buffered lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    fn push(&self, line: String) {
        let mut lines = self.lines.lock();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    fn format(&self, record: &Record) -> String {
        format!(
            "[{}] {:<5} {}: {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        write_console(record.level(), &line);
        self.push(line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(level: Level, line: &str) {
    if level <= Level::Warn {
        eprintln!("{}", line);
    }
}

/// Install the global logger. Can only succeed once per process.
pub fn init_logger(capacity: usize, app_name: &str, level: LevelFilter) -> Result<&'static RollingLogger, LoggerError> {
    LOGGER
        .set(RollingLogger::new(capacity, app_name, level))
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    let logger = LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    log::set_logger(logger).map_err(|_| LoggerError::AlreadyInitialized)?;
    log::set_max_level(level);
    log::info!("{} logger started", app_name);
    Ok(logger)
}

/// The installed logger, if any
pub fn logger() -> Option<&'static RollingLogger> {
    LOGGER.get()
}

/// Buffered lines of the installed logger (empty before init)
pub fn recent() -> Vec<String> {
    logger().map(RollingLogger::recent).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(logger: &RollingLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target("test")
                .build(),
        );
    }

    #[test]
    fn test_buffer_keeps_most_recent() {
        let logger = RollingLogger::new(3, "Test", LevelFilter::Trace);
        for i in 0..5 {
            emit(&logger, Level::Info, &format!("line {}", i));
        }
        let lines = logger.recent();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("line 2"));
        assert!(lines[2].ends_with("line 4"));
    }

    #[test]
    fn test_level_filter() {
        let logger = RollingLogger::new(10, "Test", LevelFilter::Warn);
        emit(&logger, Level::Debug, "hidden");
        emit(&logger, Level::Error, "shown");
        let lines = logger.recent();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("ERROR"));
    }

    #[test]
    fn test_zero_capacity_keeps_one_line() {
        let logger = RollingLogger::new(0, "Test", LevelFilter::Info);
        emit(&logger, Level::Info, "a");
        emit(&logger, Level::Info, "b");
        assert_eq!(logger.recent().len(), 1);
        logger.clear();
        assert!(logger.recent().is_empty());
    }

    #[test]
    fn test_init_only_once() {
        let logger = init_logger(50, "Test", LevelFilter::Info).unwrap();
        assert_eq!(logger.app_name(), "Test");
        log::warn!("[TASKS] Reorder failed");
        assert!(recent().iter().any(|l| l.contains("WARN") && l.ends_with("[TASKS] Reorder failed")));
        assert_eq!(init_logger(50, "Again", LevelFilter::Info).unwrap_err(), LoggerError::AlreadyInitialized);
    }
}
