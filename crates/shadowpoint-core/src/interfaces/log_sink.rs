//! Line-oriented diagnostic sinks

use chrono::Utc;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Append-only target for best-effort diagnostics
pub trait LogSink: Send + Sync {
    fn append_line(&self, line: &str);
}

/// Forwards lines to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn append_line(&self, line: &str) {
        tracing::info!(target: "shadowpoint::log_sink", "{}", line);
    }
}

/// Appends timestamped lines to a file
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn append_line(&self, line: &str) {
        let _guard = self.guard.lock();
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "[{}] {}", Utc::now().to_rfc3339(), line));
        if let Err(e) = written {
            tracing::warn!("Failed to write to log file {}: {}", self.path.display(), e);
        }
    }
}

/// Keeps lines in memory
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for MemoryLogSink {
    fn append_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
