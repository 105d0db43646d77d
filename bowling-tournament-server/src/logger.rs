use chrono::Local;
use log::{set_logger, set_max_level, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

static LOGGER: Logger = Logger;

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    set_logger(&LOGGER)?;
    set_max_level(level);
    Ok(())
}

#[derive(Copy, Clone, Debug)]
pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // sqlx logs every statement at info.
        if metadata.target().starts_with("sqlx") {
            return metadata.level() <= Level::Warn;
        }

        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = Local::now().format("%Y-%m-%d %H:%M:%S");

        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };

        println!(
            "[{}] [{}:{}] [{}] {}",
            now,
            record.file().unwrap_or("???"),
            record.line().unwrap_or(0),
            level,
            record.args()
        );
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use log::{Level, Log, MetadataBuilder};

    use super::Logger;

    #[test]
    fn test_logger_enabled() {
        let sqlx = MetadataBuilder::new()
            .target("sqlx::query")
            .level(Level::Info)
            .build();
        assert!(!Logger.enabled(&sqlx));

        let sqlx = MetadataBuilder::new()
            .target("sqlx::query")
            .level(Level::Warn)
            .build();
        assert!(Logger.enabled(&sqlx));

        let server = MetadataBuilder::new()
            .target("bowling_tournament_server::http")
            .level(Level::Trace)
            .build();
        assert!(Logger.enabled(&server));
    }
}
