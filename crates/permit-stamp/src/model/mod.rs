//! Attachment and job records shared by the stamping workflow.

pub mod attachment;
pub mod job;

pub use attachment::{
    Attachment, AttachmentId, AttachmentStatus, AttachmentType, AttachmentVersion, OperationRef,
    RawAttachment, VersionNumber,
};
pub use job::{JobId, JobPhase, StampingJob};
