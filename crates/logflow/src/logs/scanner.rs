//! Recursive `*.log` directory scanning.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::parser::parse_bytes;
use super::record::LogRecord;

/// Scans a directory tree for `.log` files and parses them.
#[derive(Debug, Clone)]
pub struct LogScanner {
    root: PathBuf,
}

impl LogScanner {
    /// Create a scanner rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory this scanner reads.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every `.log` file below the root.
    ///
    /// Files are visited in file-name order within each directory. A missing
    /// root yields no records; unreadable files are logged and skipped.
    pub fn scan(&self) -> Vec<LogRecord> {
        let mut records = Vec::new();

        if !self.root.is_dir() {
            warn!(dir = %self.root.display(), "Log directory does not exist");
            return records;
        }

        let mut files_read = 0usize;
        let mut files_skipped = 0usize;

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Failed to walk log directory entry");
                    continue;
                }
            };

            if entry.file_type().is_dir() || !is_log_file(entry.path()) {
                continue;
            }

            match read_log_file(entry.path()) {
                Ok(bytes) => {
                    let parsed = parse_bytes(&bytes);
                    debug!(
                        path = %entry.path().display(),
                        records = parsed.len(),
                        "Parsed log file"
                    );
                    records.extend(parsed);
                    files_read += 1;
                }
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Failed to read log file");
                    files_skipped += 1;
                }
            }
        }

        info!(
            dir = %self.root.display(),
            files_read,
            files_skipped,
            records = records.len(),
            "Log scan complete"
        );

        records
    }
}

/// Read a `.log` entry, following symlinks. Only regular files are read.
fn read_log_file(path: &Path) -> io::Result<Vec<u8>> {
    if !fs::metadata(path)?.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    fs::read(path)
}

/// Scan `dir` recursively; shorthand for [`LogScanner::scan`].
pub fn scan(dir: impl Into<PathBuf>) -> Vec<LogRecord> {
    LogScanner::new(dir).scan()
}

/// True when the file name ends in `.log`, ignoring case.
#[must_use]
pub fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(".log"))
        .unwrap_or(false)
}

/// Human-readable dump of parsed records, one per line.
#[must_use]
pub fn render_listing(dir: &Path, records: &[LogRecord]) -> String {
    if records.is_empty() {
        return format!("No log entries found in directory: {}", dir.display());
    }

    let mut out = format!(
        "Read {} log entries from '{}'. Below are the parsed lines (one per line):\n",
        records.len(),
        dir.display()
    );
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "[{}] [{}] [{}] {}",
            record.timestamp_display(),
            record.level,
            record.service,
            record.message
        );
    }
    out
}
