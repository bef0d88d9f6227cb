use crate::models::error::{BackupError, Result};
use chrono::{Local, NaiveDateTime};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only text log. Every line is `<timestamp> - <message>`.
pub struct LogSink {
    file: Mutex<File>,
}

impl LogSink {
    /// Open (or create) the log file for appending
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|cause| BackupError::LogSink {
                path: path.to_path_buf(),
                cause,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|cause| BackupError::LogSink {
                path: path.to_path_buf(),
                cause,
            })?;

        Ok(LogSink {
            file: Mutex::new(file),
        })
    }

    pub fn append(&self, timestamp: NaiveDateTime, message: &str) -> io::Result<()> {
        let line = format_line(timestamp, message);
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink lock poisoned"))?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

pub fn format_line(timestamp: NaiveDateTime, message: &str) -> String {
    format!("{} - {}\n", timestamp.format(TIMESTAMP_FORMAT), message)
}

/// Logger that writes every record to the log sink and to the console
pub struct FileLogger {
    level: LevelFilter,
    sink: LogSink,
    console: env_logger::Logger,
}

impl FileLogger {
    pub fn new(sink: LogSink, level: LevelFilter) -> Self {
        let console = env_logger::Builder::from_default_env()
            .filter_level(level)
            .format_timestamp_secs()
            .build();

        FileLogger {
            level,
            sink,
            console,
        }
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if self.console.matches(record) {
            self.console.log(record);
        }

        // Nowhere left to report a failing log file
        let _ = self
            .sink
            .append(Local::now().naive_local(), &record.args().to_string());
    }

    fn flush(&self) {
        self.console.flush();
    }
}

/// Install the file logger as the global `log` backend
pub fn init_file_logger(log_file: &Path, level: LevelFilter) -> Result<()> {
    let sink = LogSink::open(log_file)?;
    let logger = FileLogger::new(sink, level);
    log::set_max_level(level);
    log::set_boxed_logger(Box::new(logger)).map_err(|e| BackupError::LogSink {
        path: log_file.to_path_buf(),
        cause: io::Error::new(io::ErrorKind::Other, e.to_string()),
    })
}

pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use log::Level;
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 6)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line(at(3, 4, 5), "Backup script initiated."),
            "2024-01-06 03:04:05 - Backup script initiated.\n"
        );
    }

    #[test]
    fn test_sink_appends_in_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs").join("backup_log.txt");

        let sink = LogSink::open(&path).unwrap();
        sink.append(at(1, 0, 0), "first").unwrap();
        sink.append(at(1, 0, 1), "second").unwrap();
        drop(sink);

        // Reopening keeps what was already written
        let sink = LogSink::open(&path).unwrap();
        sink.append(at(1, 0, 2), "third").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "2024-01-06 01:00:00 - first\n2024-01-06 01:00:01 - second\n2024-01-06 01:00:02 - third\n"
        );
    }

    #[test]
    fn test_logger_filters_by_level() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("backup_log.txt");
        let logger = FileLogger::new(LogSink::open(&path).unwrap(), LevelFilter::Warn);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("dropped"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("kept"))
                .build(),
        );

        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("dropped"));
        assert!(contents.trim_end().ends_with(" - kept"));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("warn"), LevelFilter::Warn);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }
}
