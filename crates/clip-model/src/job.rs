//! Observable state of a clip job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a clip job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// No job has run yet.
    Idle,
    /// Clips are being rendered.
    Running,
    /// Cancel requested; the in-flight clip is finishing.
    Cancelling,
    /// Every clip was rendered.
    Completed,
    /// Stopped at a clip boundary after a cancel request.
    Cancelled,
    /// Stopped by an error.
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Cancelled | JobStatus::Failed
        )
    }

    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Running | JobStatus::Cancelling)
    }
}

/// Severity marker of a job log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

/// One line of the job log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

/// Snapshot of a job as seen by observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobState {
    pub status: JobStatus,
    /// Fraction of clips rendered, in `[0, 1]`.
    pub progress: f64,
    pub log: Vec<LogEntry>,
    pub cancel_requested: bool,
    pub total_clips: u32,
    pub completed_clips: u32,
}

impl Default for JobState {
    fn default() -> Self {
        Self {
            status: JobStatus::Idle,
            progress: 0.0,
            log: Vec::new(),
            cancel_requested: false,
            total_clips: 0,
            completed_clips: 0,
        }
    }
}

impl JobState {
    /// Fresh state for a job that is about to render `total_clips` clips.
    pub fn running(total_clips: u32) -> Self {
        Self {
            status: JobStatus::Running,
            total_clips,
            ..Self::default()
        }
    }

    pub fn entries(&self, level: LogLevel) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().filter(move |e| e.level == level)
    }

    pub fn last_error(&self) -> Option<&LogEntry> {
        self.log.iter().rev().find(|e| e.level == LogLevel::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Cancelling.is_terminal());
        assert!(JobStatus::Cancelling.is_active());
        assert!(!JobStatus::Idle.is_active());
    }

    #[test]
    fn test_entries_filter_by_level() {
        let mut state = JobState::running(3);
        state.log.push(LogEntry::new(LogLevel::Info, "Processing clip 1/3"));
        state.log.push(LogEntry::new(LogLevel::Success, "Completed: a.mp4"));
        state.log.push(LogEntry::new(LogLevel::Error, "disk full"));
        assert_eq!(state.entries(LogLevel::Success).count(), 1);
        assert_eq!(state.last_error().map(|e| e.message.as_str()), Some("disk full"));
    }
}
