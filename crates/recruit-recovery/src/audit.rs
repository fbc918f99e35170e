//! Append-only audit trail for recovery runs.
//!
//! The audit log is a side channel: a sink that cannot write drops the line
//! and reports the failure through `tracing`, it never fails the caller.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Destination for human-readable progress and outcome lines.
pub trait AuditSink {
    fn record(&self, message: &str);
}

impl<T: AuditSink + ?Sized> AuditSink for &T {
    fn record(&self, message: &str) {
        (**self).record(message)
    }
}

/// Appends timestamped lines to a file, opening it per write.
#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{stamp}] {message}")
    }
}

impl AuditSink for FileAuditLog {
    fn record(&self, message: &str) {
        if let Err(err) = self.append(message) {
            warn!(path = %self.path.display(), error = %err, "audit log write failed");
        }
    }
}

/// Keeps audit lines in memory; used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.lines().iter().any(|line| line.contains(fragment))
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, message: &str) {
        match self.lines.lock() {
            Ok(mut guard) => guard.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
