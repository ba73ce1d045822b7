use std::io::Write;

use log::{self, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Evaluates a `Result`, logging the error at `debug` level and yielding `None` if it failed.
macro_rules! catching {
    ($expr: expr) => (catching!("{:?}", $expr));
    ($fmt: tt, $expr: expr) => (match $expr {
        Ok(v) => Some(v),
        Err(e) => {
            debug!($fmt, e);
            None
        },
    });
}

pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

pub struct SimpleLogger {
    level: LevelFilter,
}

impl SimpleLogger {
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(SimpleLogger { level: level }))
            .map(|()| log::set_max_level(level))
    }
}

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(&mut ::std::io::stderr(), "[{}] [{}] {}",
                             record.metadata().target(), record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = ::std::io::stderr().flush();
    }
}

/// Installs the stderr logger. Later calls only adjust the maximum level, so tests and embedders
/// may call this freely.
pub fn init(level: LevelFilter) {
    if SimpleLogger::init(level).is_err() {
        log::set_max_level(level);
    }
}

/// Parses a level name such as `debug` or `WARN`; unknown names fall back to the default level.
pub fn parse_level(name: &str) -> LevelFilter {
    name.trim().parse().unwrap_or(DEFAULT_LOG_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" TRACE "), LevelFilter::Trace);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("chatty"), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn init_twice_is_harmless() {
        init(LevelFilter::Info);
        init(LevelFilter::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }
}
