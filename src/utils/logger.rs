// src/utils/logger.rs

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use std::io::Write;

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Writes records to stderr so stdout stays free for `show` output.
struct ConsoleLogger;

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
  log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

/// Icon and label shown in front of each message.
fn decoration(level: Level) -> (&'static str, &'static str) {
  match level {
    Level::Error => ("🔴", "error"),
    Level::Warn => ("🟠", "warn"),
    Level::Info => ("🔵", "info"),
    Level::Debug => ("⚪", "debug"),
    Level::Trace => ("▫️", "trace"),
  }
}

fn format_record(level: Level, args: &std::fmt::Arguments) -> String {
  let (icon, label) = decoration(level);
  // Format: "🔴 error  File not found"
  format!("{} {:<5}  {}", icon, label, args)
}

impl log::Log for ConsoleLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= log::max_level()
  }

  fn log(&self, record: &Record) {
    if self.enabled(record.metadata()) {
      let line = format_record(record.level(), record.args());
      let mut err = std::io::stderr().lock();
      let _ = writeln!(err, "{}", line);
    }
  }

  fn flush(&self) {
    let _ = std::io::stderr().flush();
  }
}
