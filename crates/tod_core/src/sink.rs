//! Append-only text log
//!
//! Every record is flushed and synced before `write_record` returns, so a
//! crash between ticks never loses a record. Failures are swallowed: the log
//! is observability only.

use chrono::{Local, NaiveDateTime};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SinkError;

/// C `asctime` layout without the trailing newline, e.g. `Sat Mar  9 14:02:03 2019`.
pub fn asctime(time: &NaiveDateTime) -> String {
    time.format("%a %b %e %H:%M:%S %Y").to_string()
}

pub fn timestamp_record(time: &NaiveDateTime) -> String {
    format!("\nCurrent time : {}\n", asctime(time))
}

pub fn sample_record(elapsed: i32, value: i32, threshold: i32) -> String {
    format!("{} | {} | {}\n", elapsed, value, threshold)
}

#[derive(Debug)]
pub struct LogSink {
    file: Option<File>,
    path: Option<PathBuf>,
    failed_writes: u32,
}

impl LogSink {
    /// Create (or truncate) the log file.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|source| SinkError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Opened log sink {:?}", path);
        Ok(Self::from_file(file, path))
    }

    /// Wrap an already opened file.
    pub fn from_file(file: File, path: &Path) -> Self {
        Self {
            file: Some(file),
            path: Some(path.to_path_buf()),
            failed_writes: 0,
        }
    }

    /// A sink that accepts records and drops them.
    pub fn disabled() -> Self {
        Self {
            file: None,
            path: None,
            failed_writes: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn failed_writes(&self) -> u32 {
        self.failed_writes
    }

    /// Append one record; errors are logged and counted, never returned.
    pub fn write_record(&mut self, record: &str) {
        if let Err(err) = self.try_write(record) {
            self.failed_writes += 1;
            log::warn!("Dropping log record: {}", err);
        }
    }

    pub fn write_timestamp(&mut self) {
        let now = Local::now().naive_local();
        self.write_record(&timestamp_record(&now));
    }

    fn try_write(&mut self, record: &str) -> Result<(), SinkError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        file.write_all(record.as_bytes())?;
        file.flush()?;
        file.sync_data()?;
        Ok(())
    }

    /// Close the file. Later records are dropped.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(err) = file.sync_all() {
                log::warn!("Failed to sync log sink on close: {}", err);
            }
            log::debug!("Closed log sink {:?}", self.path);
        }
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        self.close();
    }
}
