//! Structured line logger.
//!
//! A [`Logger`] is created once in `main` and handed down to every component
//! that reports progress. It never fails: sinks swallow their own I/O
//! problems. Each [`LogEntry`] carries a timestamp, a level, a message and
//! optional structured extras.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub extras: Map<String, Value>,
}

/// Destination for log entries. Writing must not fail.
pub trait LogSink: Send + Sync {
    fn write(&self, entry: &LogEntry);
}

/// Prints entries to stdout using the colored bullet style of the CLI.
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, entry: &LogEntry) {
        let glyph = match entry.level {
            Level::Info => "o".blue().bold(),
            Level::Success => "✓".green().bold(),
            Level::Warning => "!".yellow().bold(),
            Level::Error => "!".red().bold(),
        };
        let time = entry.timestamp.format("%m/%d/%Y %I:%M:%S %p").to_string();

        if entry.extras.is_empty() {
            println!("[{}] {} {}", glyph, time.dimmed(), entry.message);
        } else {
            let extras = Value::Object(entry.extras.clone());
            println!(
                "[{}] {} {} {}",
                glyph,
                time.dimmed(),
                entry.message,
                extras.to_string().dimmed()
            );
        }
    }
}

/// Cheap, cloneable handle to a [`LogSink`].
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleSink))
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message.into(), Map::new());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(Level::Success, message.into(), Map::new());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::Warning, message.into(), Map::new());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message.into(), Map::new());
    }

    /// Logs `message` with structured extras.
    ///
    /// `extras` is expected to be a JSON object; any other value is stored
    /// under the `value` key.
    pub fn with_extras(&self, level: Level, message: impl Into<String>, extras: Value) {
        let extras = match extras {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        self.log(level, message.into(), extras);
    }

    fn log(&self, level: Level, message: String, extras: Map<String, Value>) {
        self.sink.write(&LogEntry {
            timestamp: Utc::now(),
            level,
            message,
            extras,
        });
    }
}
