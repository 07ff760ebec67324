//! Client-side view of a server stamping job.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned job identifier. The API has delivered both numeric and
/// string ids, so either is accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        use serde_json::Value;

        match Value::deserialize(deserializer)? {
            Value::String(s) if !s.is_empty() => Ok(JobId(s)),
            Value::Number(n) => Ok(JobId(n.to_string())),
            other => Err(D::Error::custom(format!(
                "job id must be a non-empty string or a number, got {}",
                other
            ))),
        }
    }
}

/// Lifecycle of the job itself, as opposed to the whole workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Starting,
    Running,
    Done,
}

/// A submitted job and the most recent progress snapshot seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampingJob {
    pub job_id: JobId,
    pub version: u64,
    pub phase: JobPhase,
}

impl StampingJob {
    /// A freshly submitted job; polling starts from version 0.
    pub fn submitted(job_id: JobId) -> Self {
        Self {
            job_id,
            version: 0,
            phase: JobPhase::Starting,
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == JobPhase::Done
    }
}
