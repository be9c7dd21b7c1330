//! Rolling Logger
//!
//! Writes formatted events to one log file per day and keeps the most recent
//! lines in memory. `log` records from libraries are captured as well.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use chrono::{Local, NaiveDate};
use tracing_subscriber::fmt::MakeWriter;

/// Lines kept by `recent_lines`
pub const BUFFER_CAPACITY: usize = 500;

static SINK: OnceLock<Arc<LogSink>> = OnceLock::new();

#[derive(Debug)]
pub enum LoggerError {
    Io(io::Error),
    AlreadyInitialized,
    NotInitialized,
    Subscriber(String),
}

impl std::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggerError::Io(e) => write!(f, "Log I/O error: {}", e),
            LoggerError::AlreadyInitialized => write!(f, "Logger already initialized"),
            LoggerError::NotInitialized => write!(f, "Logger not initialized"),
            LoggerError::Subscriber(msg) => write!(f, "Failed to install subscriber: {}", msg),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(e: io::Error) -> Self {
        LoggerError::Io(e)
    }
}

/// Destination shared by every writer the subscriber creates
pub struct LogSink {
    dir: PathBuf,
    app_name: String,
    capacity: usize,
    recent: Mutex<VecDeque<String>>,
}

impl LogSink {
    pub fn new(dir: PathBuf, app_name: &str, capacity: usize) -> Self {
        Self {
            dir,
            app_name: app_name.to_string(),
            capacity,
            recent: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn file_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}-{}.log", self.app_name, date.format("%Y-%m-%d")))
    }

    /// Append formatted output to today's file and the ring buffer
    pub fn record(&self, bytes: &[u8]) -> io::Result<()> {
        {
            let text = String::from_utf8_lossy(bytes);
            let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                if recent.len() == self.capacity {
                    recent.pop_front();
                }
                recent.push_back(line.trim_end().to_string());
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_path(Local::now().date_naive()))?;
        file.write_all(bytes)
    }

    pub fn recent(&self) -> Vec<String> {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

pub struct SinkWriter(Arc<LogSink>);

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.record(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct SinkMaker(Arc<LogSink>);

impl<'a> MakeWriter<'a> for SinkMaker {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter(self.0.clone())
    }
}

/// Install the global subscriber writing under `log_dir`
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), LoggerError> {
    fs::create_dir_all(&log_dir)?;
    let sink = Arc::new(LogSink::new(log_dir, app_name, BUFFER_CAPACITY));
    SINK.set(sink.clone())
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(true)
        .with_writer(SinkMaker(sink))
        .try_init()
        .map_err(|e| LoggerError::Subscriber(e.to_string()))?;

    log::info!("Logger initialized for {}", app_name);
    Ok(())
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    SINK.get().ok_or(LoggerError::NotInitialized)?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    SINK.get().ok_or(LoggerError::NotInitialized)?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent formatted lines, oldest first
pub fn recent_lines() -> Vec<String> {
    SINK.get().map(|sink| sink.recent()).unwrap_or_default()
}
