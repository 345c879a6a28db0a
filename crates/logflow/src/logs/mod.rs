//! Log ingestion: turning `*.log` files into structured records.

mod parser;
mod record;
mod scanner;

pub use parser::{parse_bytes, parse_line, parse_str, parse_timestamp};
pub use record::{LogLevel, LogRecord, NO_TIMESTAMP, UNKNOWN_SERVICE};
pub use scanner::{is_log_file, render_listing, scan, LogScanner};
