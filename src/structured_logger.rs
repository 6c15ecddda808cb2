//! Structured JSONL logger for debugging and session reconstruction.
//!
//! Machine-parseable log with monotonic sequence numbers, microsecond UTC
//! timestamps, and session/run correlation. One line per event.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::supervisor::Stage;

pub struct StructuredLogger {
    session_id: String,
    run_id: AtomicU64,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Serialize, serde::Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence number, unique across the session.
    pub seq: u64,
    /// ISO 8601 timestamp with microseconds.
    pub ts: String,
    pub session_id: String,
    /// Increments on every resume of the session.
    pub run_id: u64,
    pub component: String,
    pub event: Value,
}

impl StructuredLogger {
    /// Opens (appending) the event log for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be opened.
    pub fn new(session_id: &str, log_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(log_path)?;

        Ok(Self {
            session_id: session_id.to_string(),
            run_id: AtomicU64::new(1),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path: log_path.to_path_buf(),
        })
    }

    /// Increments the run ID (called when a suspended session resumes).
    pub fn increment_run_id(&self) {
        self.run_id.fetch_add(1, Ordering::SeqCst);
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Logs a structured event as a single JSON line. Thread-safe; write
    /// failures are swallowed, logging never takes the workflow down.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            session_id: self.session_id.clone(),
            run_id: self.run_id.load(Ordering::SeqCst),
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    pub fn log_stage_selected(&self, stage: Stage) {
        self.log(
            "Supervisor",
            serde_json::json!({
                "type": "StageSelected",
                "stage": stage.label()
            }),
        );
    }

    pub fn log_stage_complete(&self, stage: Stage) {
        self.log(
            "Supervisor",
            serde_json::json!({
                "type": "StageComplete",
                "stage": stage.label()
            }),
        );
    }

    pub fn log_suspended(&self, revision_count: u32) {
        self.log(
            "Session",
            serde_json::json!({
                "type": "Suspended",
                "awaiting": "human",
                "revision_count": revision_count
            }),
        );
    }

    pub fn log_response_received(&self, kind: &str) {
        self.log(
            "Session",
            serde_json::json!({
                "type": "ResponseReceived",
                "kind": kind
            }),
        );
    }

    pub fn log_outcome(&self, outcome: &str) {
        self.log(
            "Session",
            serde_json::json!({
                "type": "Outcome",
                "outcome": outcome
            }),
        );
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_entries(path: &Path) -> Vec<LogEntry> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_entries_have_monotonic_seq() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = StructuredLogger::new("s1", &path).unwrap();

        logger.log_stage_selected(Stage::Analyze);
        logger.log_stage_complete(Stage::Analyze);
        logger.log_suspended(0);

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].seq, 1);
        assert_eq!(entries[1].seq, 2);
        assert_eq!(entries[2].seq, 3);
        assert!(entries.iter().all(|e| e.session_id == "s1"));
    }

    #[test]
    fn test_run_id_increments_on_resume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = StructuredLogger::new("s1", &path).unwrap();

        logger.log_suspended(0);
        logger.increment_run_id();
        logger.log_response_received("approve");

        let entries = read_entries(&path);
        assert_eq!(entries[0].run_id, 1);
        assert_eq!(entries[1].run_id, 2);
    }

    #[test]
    fn test_appends_across_logger_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        {
            let logger = StructuredLogger::new("s1", &path).unwrap();
            logger.log_outcome("suspended");
        }
        {
            let logger = StructuredLogger::new("s1", &path).unwrap();
            logger.log_outcome("sent");
        }

        assert_eq!(read_entries(&path).len(), 2);
    }
}
