//! Logging sinks and clocks behind the domain logging traits.

use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Writes entries to the browser console, or stderr off the web.
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Debug)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        write_line(entry.level, &entry.format_line());
    }
}

#[cfg(target_arch = "wasm32")]
fn write_line(level: LogLevel, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&line),
        LogLevel::Info => web_sys::console::info_1(&line),
        LogLevel::Warn => web_sys::console::warn_1(&line),
        LogLevel::Error => web_sys::console::error_1(&line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_line(_level: LogLevel, line: &str) {
    eprintln!("{}", line);
}

/// Collects formatted lines in memory; clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemoryLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, entry: LogEntry) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(entry.format_line());
        }
    }
}

/// Wall clock via chrono; works in the browser through its wasm bindings.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChronoTimeProvider;

impl ChronoTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for ChronoTimeProvider {
    fn current_timestamp(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        DateTime::<Utc>::from_timestamp_millis(timestamp as i64)
            .map(|time| time.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| timestamp.to_string())
    }
}
