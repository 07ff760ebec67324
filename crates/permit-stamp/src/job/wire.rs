//! Request and response bodies of the stamping command and job query.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{AttachmentId, AttachmentStatus, JobId, JobPhase};
use crate::stamp::{PageSelector, StampConfiguration};

pub const STAMP_COMMAND: &str = "stamp-attachments";
pub const STAMP_JOB_QUERY: &str = "stamp-attachments-job";

/// `result` value of a poll response that carries progress.
pub const RESULT_UPDATE: &str = "update";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampConfigPayload {
    pub text: String,
    pub lang: String,
    pub timestamp_millis: i64,
    pub organization: String,
    pub x_margin: i64,
    pub y_margin: i64,
    pub page: PageSelector,
    pub transparency: u8,
    pub extra_info: String,
    pub kuntalupatunnus: String,
    pub section: String,
}

impl StampConfigPayload {
    pub fn new(config: &StampConfiguration, lang: &str) -> Self {
        Self {
            text: config.text.clone(),
            lang: lang.to_string(),
            timestamp_millis: config.timestamp_millis,
            organization: config.organization.clone(),
            x_margin: config.x_margin,
            y_margin: config.y_margin,
            page: config.page,
            transparency: config.transparency,
            extra_info: config.extra_info.clone(),
            kuntalupatunnus: config.kuntalupatunnus.clone(),
            section: config.section.clone(),
        }
    }
}

/// Body of the stamping command. `id` is the application id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub id: String,
    pub attachment_ids: Vec<AttachmentId>,
    pub stamp_config: StampConfigPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobRef {
    pub id: JobId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default = "default_ok")]
    pub ok: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub job: Option<JobRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollRequest {
    pub job_id: JobId,
    pub version: u64,
}

/// Latest known state of one attachment inside the job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResult {
    #[serde(default)]
    pub status: AttachmentStatus,
    #[serde(default)]
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobUpdate {
    pub version: u64,
    pub status: JobPhase,
    #[serde(default)]
    pub value: HashMap<AttachmentId, AttachmentResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollResponse {
    #[serde(default = "default_ok")]
    pub ok: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub job: Option<JobUpdate>,
}

impl PollResponse {
    /// The job snapshot, if this response is an update.
    pub fn update(&self) -> Option<&JobUpdate> {
        match self.result.as_deref() {
            Some(RESULT_UPDATE) => self.job.as_ref(),
            _ => None,
        }
    }
}

fn default_ok() -> bool {
    true
}
