//! Logging module
//!
//! Appends timestamped lines to the console and to an append-only log file.
//! The file handle lives behind one mutex and every entry is written as a
//! single line per lock acquisition, so concurrent request tasks can never
//! interleave bytes mid-line.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hyper::Method;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialized writer over the console and the log file.
pub struct LogSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogSink {
    /// Open (or create) the log file for appending.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Append one `<timestamp>: <message>` line to console and file.
    pub fn write(&self, message: &str) {
        let line = format!("{}: {message}", Local::now().format(TIMESTAMP_FORMAT));
        println!("{line}");
        if let Ok(mut file) = self.file.lock() {
            // One writeln per lock keeps each line a single atomic append.
            let _ = writeln!(file, "{line}");
        }
    }

    /// Current log file contents, read under the write lock.
    pub fn read_all(&self) -> io::Result<String> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log sink lock poisoned"))?;
        let mut contents = String::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_string(&mut contents)?;
        Ok(contents)
    }

    /// Truncate the log file to zero length, leaving it in place.
    pub fn clear(&self) -> io::Result<()> {
        let file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log sink lock poisoned"))?;
        // Append mode writes always land at the current end, so truncating
        // under the lock is safe with respect to concurrent writers.
        file.set_len(0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log_request(&self, method: &Method, path: &str) {
        self.write(&format!("Request: {method} {path}"));
    }

    pub fn log_error(&self, message: &str) {
        self.write(&format!("ERROR: {message}"));
    }

    pub fn log_warning(&self, message: &str) {
        self.write(&format!("WARN: {message}"));
    }
}
