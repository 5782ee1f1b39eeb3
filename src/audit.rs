//! Append-only audit trail of every mutation and fatal condition.
//!
//! The log is a plain text file meant for a human reading back over a run,
//! not for machine parsing. Each event is opened, appended, and closed in a
//! single call, so a crash mid-run loses at most the event being written.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Handle on the audit log file. Cheap to clone around the run.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped event line.
    pub fn record(&self, message: &str) -> Result<()> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.append(&format!("{stamp} - {message}\n"))
    }

    /// Append raw text, e.g. a multi-line candidate listing already laid out
    /// by the caller.
    pub fn record_raw(&self, text: &str) -> Result<()> {
        self.append(text)
    }

    fn append(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create audit log dir {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open audit log {}", self.path.display()))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("append audit log {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_appends_timestamped_lines() {
        let tmp = TempDir::new().unwrap();
        let log = AuditLog::new(tmp.path().join("change_log.log"));

        log.record("first event").unwrap();
        log.record("second event").unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("- first event"));
        assert!(lines[1].ends_with("- second event"));
    }

    #[test]
    fn record_creates_missing_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let log = AuditLog::new(tmp.path().join("nested/dir/audit.log"));
        log.record("created").unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn record_raw_appends_verbatim() {
        let tmp = TempDir::new().unwrap();
        let log = AuditLog::new(tmp.path().join("audit.log"));
        log.record_raw("1) Line 3: candidate\n").unwrap();
        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "1) Line 3: candidate\n"
        );
    }
}
