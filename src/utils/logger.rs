// src/utils/logger.rs

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::sync::OnceLock;

static MAX_LEVEL: OnceLock<LevelFilter> = OnceLock::new();
static LOGGER: ConsoleLogger = ConsoleLogger;

struct ConsoleLogger;

/// Install the stderr logger. Calling it twice returns the `log` crate's error.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
  let _ = MAX_LEVEL.set(level);
  log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

/// Level for the CLI: `-v` enables debug output, otherwise info.
pub fn level_for(verbose: bool) -> LevelFilter {
  if verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  }
}

fn tag(level: Level) -> &'static str {
  match level {
    Level::Error => "error",
    Level::Warn => "warn ",
    Level::Info => "info ",
    Level::Debug => "debug",
    Level::Trace => "trace",
  }
}

impl log::Log for ConsoleLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= *MAX_LEVEL.get().unwrap_or(&LevelFilter::Info)
  }

  fn log(&self, record: &Record) {
    if self.enabled(record.metadata()) {
      // Format: "[warn ] zeocat::physics::operations::divalent: 3 Al centers found"
      let mut err = std::io::stderr().lock();
      let _ = writeln!(
        err,
        "[{}] {}: {}",
        tag(record.level()),
        record.target(),
        record.args()
      );
    }
  }

  fn flush(&self) {
    let _ = std::io::stderr().flush();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_level_for() {
    assert_eq!(level_for(true), LevelFilter::Debug);
    assert_eq!(level_for(false), LevelFilter::Info);
  }

  #[test]
  fn test_tags_have_equal_width() {
    let levels = [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace];
    assert!(levels.iter().all(|l| tag(*l).len() == 5));
  }
}
