//! Attachment records as delivered by the application API and as annotated
//! for the stamping list.

use std::fmt;

use serde::{Deserialize, Serialize};

pub type AttachmentId = String;

/// Attachment type key, e.g. `paapiirustus/asemapiirros`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttachmentType {
    #[serde(rename = "type-group")]
    pub type_group: String,
    #[serde(rename = "type-id")]
    pub type_id: String,
}

impl AttachmentType {
    pub fn new(type_group: &str, type_id: &str) -> Self {
        Self {
            type_group: type_group.to_string(),
            type_id: type_id.to_string(),
        }
    }
}

/// The operation (e.g. "new building") an attachment was added for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionNumber {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// One uploaded version of an attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentVersion {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub stamped: bool,
    #[serde(default)]
    pub version: Option<VersionNumber>,
    #[serde(default)]
    pub file_id: Option<String>,
}

/// Attachment as received from the application API, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttachment {
    pub id: AttachmentId,
    #[serde(rename = "type", default)]
    pub attachment_type: Option<AttachmentType>,
    /// Last modification time, epoch millis.
    #[serde(default)]
    pub modified: Option<i64>,
    #[serde(default)]
    pub for_printing: bool,
    #[serde(default)]
    pub op: Option<OperationRef>,
    #[serde(default)]
    pub versions: Option<Vec<AttachmentVersion>>,
    #[serde(default)]
    pub latest_version: Option<AttachmentVersion>,
    #[serde(default)]
    pub application_state: Option<String>,
}

impl RawAttachment {
    /// True when there is at least one version and every version is stamped.
    pub fn all_versions_stamped(&self) -> bool {
        match &self.versions {
            Some(versions) if !versions.is_empty() => versions.iter().all(|v| v.stamped),
            _ => false,
        }
    }

    /// Content type of the latest version, if any.
    pub fn latest_content_type(&self) -> Option<&str> {
        self.latest_version
            .as_ref()
            .and_then(|v| v.content_type.as_deref())
    }

    /// The last version in sequence order that has not been stamped yet.
    pub fn latest_unstamped_version(&self) -> Option<&AttachmentVersion> {
        self.versions
            .as_ref()?
            .iter()
            .rev()
            .find(|version| !version.stamped)
    }
}

/// Per-attachment stamping status reported by the job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentStatus {
    #[default]
    #[serde(alias = "")]
    Idle,
    Queued,
    Ok,
    Error,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AttachmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentStatus::Idle => write!(f, "idle"),
            AttachmentStatus::Queued => write!(f, "queued"),
            AttachmentStatus::Ok => write!(f, "ok"),
            AttachmentStatus::Error => write!(f, "error"),
            AttachmentStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// An eligible attachment annotated for the stamping list.
///
/// Display fields come from the latest unstamped version. `selected` belongs
/// to the user; `status`, `file_id` and `stamped` belong to the job poller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    pub attachment_type: Option<AttachmentType>,
    pub operation: Option<OperationRef>,
    pub application_state: Option<String>,
    pub modified: Option<i64>,
    pub for_printing: bool,
    pub content_type: String,
    pub filename: String,
    pub size: Option<u64>,
    pub version: Option<VersionNumber>,
    /// The latest version is already stamped; starting requires confirmation.
    pub restamp: bool,
    pub stamped: bool,
    pub selected: bool,
    pub status: AttachmentStatus,
    pub file_id: Option<String>,
}

impl Attachment {
    /// Annotates a raw attachment. Returns `None` when the version list is
    /// missing or has no unstamped version to show.
    pub fn from_raw(raw: &RawAttachment) -> Option<Self> {
        let latest = raw.latest_version.as_ref()?;
        let shown = raw.latest_unstamped_version()?;
        let restamp = latest.stamped;

        Some(Self {
            id: raw.id.clone(),
            attachment_type: raw.attachment_type.clone(),
            operation: raw.op.clone(),
            application_state: raw.application_state.clone(),
            modified: raw.modified,
            for_printing: raw.for_printing,
            content_type: shown.content_type.clone().unwrap_or_default(),
            filename: shown.filename.clone().unwrap_or_default(),
            size: shown.size,
            version: shown.version,
            restamp,
            stamped: restamp,
            selected: raw.for_printing && !restamp,
            status: AttachmentStatus::Idle,
            file_id: latest.file_id.clone(),
        })
    }

    /// A job has written `status`, `file_id` or `stamped` since the
    /// attachment was read from the raw record.
    pub fn touched_by_job(&self) -> bool {
        self.status != AttachmentStatus::Idle || self.stamped != self.restamp
    }

    /// Carries the user-owned selection over from a previous computation of
    /// the same attachment. Job-owned fields are carried only when a job
    /// wrote them; otherwise the fresh raw values stand.
    pub fn inherit_state(&mut self, previous: &Attachment) {
        self.selected = previous.selected;
        if previous.touched_by_job() {
            self.status = previous.status;
            self.file_id = previous.file_id.clone();
            self.stamped = previous.stamped;
        }
    }
}
