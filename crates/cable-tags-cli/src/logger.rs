use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};

/// Writes log records to stderr, keeping stdout for command output
pub struct CliLogger {
    level: LevelFilter,
}

impl CliLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// `-q` silences everything below warnings, each `-v` adds one level
    pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::Warn;
        }
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now().format("%H:%M:%S%.3f");
        if record.level() >= Level::Debug {
            eprintln!(
                "{} {:<5} [{}] {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            );
        } else {
            eprintln!("{} {:<5} {}", timestamp, record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_selection() {
        assert_eq!(CliLogger::level_for(0, false), LevelFilter::Info);
        assert_eq!(CliLogger::level_for(1, false), LevelFilter::Debug);
        assert_eq!(CliLogger::level_for(3, false), LevelFilter::Trace);
        assert_eq!(CliLogger::level_for(2, true), LevelFilter::Warn);
    }
}
