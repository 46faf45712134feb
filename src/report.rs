use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::Error;

pub const DEFAULT_LOG_CAPACITY: usize = 500;
pub const ERROR_LOG_FILE: &str = "error_log.txt";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format(TIMESTAMP_FORMAT), self.message)
    }
}

/// Recoverable problems of one batch. Holds at most `capacity` entries; the
/// oldest entry is dropped first.
#[derive(Debug)]
pub struct ErrorLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    dropped: usize,
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl ErrorLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(LogEntry {
            timestamp: Local::now(),
            message,
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries evicted because the log was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn render(&self) -> String {
        let mut out = String::from("--- Error and warning log ---\n");
        out.push_str(&format!(
            "Generated: {}\n\n",
            Local::now().format(TIMESTAMP_FORMAT)
        ));
        if self.entries.is_empty() {
            out.push_str("No errors or warnings were recorded.\n");
        }
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    /// Write the log as `error_log.txt` inside `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, Error> {
        let path = dir.join(ERROR_LOG_FILE);
        std::fs::write(&path, self.render())?;
        Ok(path)
    }
}

/// Outcome of one table, created while the batch runs.
#[derive(Debug)]
pub struct ExtractionResult {
    pub record_index: usize,
    pub resolved_name: String,
    pub used_fallback: bool,
    pub images_found: usize,
    pub images_written: usize,
    pub output_folder: Option<PathBuf>,
    pub error: Option<String>,
    pub timed_out: bool,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub total_records: usize,
    pub records_with_folder: usize,
    pub total_images_found: usize,
    pub total_images_written: usize,
    pub results: Vec<ExtractionResult>,
    pub error_log: ErrorLog,
    pub error_log_path: Option<PathBuf>,
    pub cancelled: bool,
}

impl BatchReport {
    pub(crate) fn record(&mut self, result: ExtractionResult) {
        if result.output_folder.is_some() {
            self.records_with_folder += 1;
        }
        self.total_images_found += result.images_found;
        self.total_images_written += result.images_written;
        self.results.push(result);
    }

    pub fn records_processed(&self) -> usize {
        self.results.len()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tables found:      {}", self.total_records)?;
        writeln!(f, "Tables processed:  {}", self.records_processed())?;
        writeln!(f, "Folders created:   {}", self.records_with_folder)?;
        writeln!(f, "Images found:      {}", self.total_images_found)?;
        writeln!(f, "Images written:    {}", self.total_images_written)?;
        write!(
            f,
            "Errors logged:     {} / {}",
            self.error_log.len(),
            self.error_log.capacity()
        )?;
        if self.error_log.dropped() > 0 {
            write!(f, " ({} older entries dropped)", self.error_log.dropped())?;
        }
        if self.cancelled {
            write!(f, "\nInterrupted before the last table")?;
        }
        Ok(())
    }
}
