//! Stamping job progress broadcaster for streaming to observers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What happened to the job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Submitted,
    Update,
    PollFailed,
    Interrupted,
    Resumed,
    Done,
}

impl std::fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressKind::Submitted => write!(f, "Submitted"),
            ProgressKind::Update => write!(f, "Update"),
            ProgressKind::PollFailed => write!(f, "Poll failed"),
            ProgressKind::Interrupted => write!(f, "Interrupted"),
            ProgressKind::Resumed => write!(f, "Resumed"),
            ProgressKind::Done => write!(f, "Done"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampProgressEvent {
    pub job_id: String,
    pub kind: ProgressKind,
    /// Job version held after this event.
    pub version: u64,
    /// Attachments in the job.
    pub total: usize,
    /// Attachments updated by this event.
    pub applied: usize,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StampProgressEvent {
    pub fn new(job_id: &str, kind: ProgressKind, version: u64, total: usize, message: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            kind,
            version,
            total,
            applied: 0,
            message: message.to_string(),
            timestamp: Utc::now(),
            error: None,
        }
    }
}

/// Broadcasts progress events of stamping jobs.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<StampProgressEvent>>,
}

impl JobProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: StampProgressEvent) {
        // No active receivers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StampProgressEvent> {
        self.sender.subscribe()
    }

    /// Starts tracking a submitted job and announces it.
    pub fn start_job(&self, job_id: &str, total: usize) -> JobProgressTracker {
        let tracker = JobProgressTracker {
            job_id: job_id.to_string(),
            total,
            sender: Arc::clone(&self.sender),
        };
        tracker.emit(StampProgressEvent::new(
            job_id,
            ProgressKind::Submitted,
            0,
            total,
            "Stamping job submitted",
        ));
        tracker
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Progress reporting for one job.
pub struct JobProgressTracker {
    job_id: String,
    total: usize,
    sender: Arc<broadcast::Sender<StampProgressEvent>>,
}

impl JobProgressTracker {
    fn emit(&self, event: StampProgressEvent) {
        let _ = self.sender.send(event);
    }

    fn event(&self, kind: ProgressKind, version: u64, message: &str) -> StampProgressEvent {
        StampProgressEvent::new(&self.job_id, kind, version, self.total, message)
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn update(&self, version: u64, applied: usize) {
        let mut event = self.event(ProgressKind::Update, version, "Job progress received");
        event.applied = applied;
        self.emit(event);
    }

    pub fn poll_failed(&self, version: u64, error: &str) {
        let mut event = self.event(ProgressKind::PollFailed, version, "Job status query failed");
        event.error = Some(error.to_string());
        self.emit(event);
    }

    pub fn interrupted(&self, version: u64, error: &str) {
        let mut event = self.event(ProgressKind::Interrupted, version, "Polling interrupted");
        event.error = Some(error.to_string());
        self.emit(event);
    }

    pub fn resumed(&self, version: u64) {
        self.emit(self.event(ProgressKind::Resumed, version, "Polling resumed"));
    }

    pub fn done(&self, version: u64, applied: usize) {
        let mut event = self.event(ProgressKind::Done, version, "Stamping completed");
        event.applied = applied;
        self.emit(event);
    }
}
