//! Builders for test data.

#![allow(dead_code)]

use permit_stamp::model::{AttachmentType, AttachmentVersion, OperationRef, RawAttachment, VersionNumber};
use permit_stamp::stamp::{PageSelector, StampDefinition, StampPosition, StampRegistry};

/// Builder for `RawAttachment`. Defaults to a printable, unstamped PDF.
pub struct AttachmentBuilder {
    id: String,
    type_id: String,
    modified: i64,
    for_printing: bool,
    operation: Option<String>,
    state: String,
    versions: Vec<AttachmentVersion>,
}

impl AttachmentBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            type_id: "asemapiirros".to_string(),
            modified: 1_700_000_000_000,
            for_printing: true,
            operation: None,
            state: "submitted".to_string(),
            versions: vec![],
        }
    }

    pub fn type_id(mut self, type_id: &str) -> Self {
        self.type_id = type_id.to_string();
        self
    }

    pub fn modified(mut self, modified: i64) -> Self {
        self.modified = modified;
        self
    }

    pub fn for_printing(mut self, for_printing: bool) -> Self {
        self.for_printing = for_printing;
        self
    }

    pub fn operation(mut self, op: &str) -> Self {
        self.operation = Some(op.to_string());
        self
    }

    pub fn state(mut self, state: &str) -> Self {
        self.state = state.to_string();
        self
    }

    /// Appends a version with the given content type and stamped flag.
    pub fn version(mut self, content_type: &str, stamped: bool) -> Self {
        let n = self.versions.len() as u32;
        self.versions.push(AttachmentVersion {
            content_type: Some(content_type.to_string()),
            filename: Some(format!("{}-v{}.pdf", self.id, n)),
            size: Some(2048),
            stamped,
            version: Some(VersionNumber { major: 0, minor: n + 1 }),
            file_id: Some(format!("{}-file-{}", self.id, n)),
        });
        self
    }

    pub fn build(self) -> RawAttachment {
        let versions = if self.versions.is_empty() {
            AttachmentBuilder::new(&self.id)
                .version("application/pdf", false)
                .versions
        } else {
            self.versions
        };
        RawAttachment {
            id: self.id,
            attachment_type: Some(AttachmentType::new("paapiirustus", &self.type_id)),
            modified: Some(self.modified),
            for_printing: self.for_printing,
            op: self.operation.map(|id| OperationRef {
                name: Some(format!("{} name", id)),
                id,
                description: None,
            }),
            latest_version: versions.last().cloned(),
            versions: Some(versions),
            application_state: Some(self.state),
        }
    }
}

/// A printable single-version PDF attachment.
pub fn pdf(id: &str) -> RawAttachment {
    AttachmentBuilder::new(id).build()
}

pub fn stamp_definition(id: &str) -> StampDefinition {
    StampDefinition {
        id: id.to_string(),
        name: format!("\u{00a7} {}", id),
        position: StampPosition { x: 10, y: 200 },
        page: PageSelector::First,
        background: None,
        text: Some("Hyväksytty".to_string()),
        date: Some(1_714_651_200_000),
        organization: Some("Sipoon rakennusvalvonta".to_string()),
        extra_info: None,
        kuntalupatunnus: Some("17-0123-A".to_string()),
    }
}

pub fn stamp_registry() -> StampRegistry {
    StampRegistry::new(vec![stamp_definition("default"), stamp_definition("verdict")])
        .expect("valid stamp definitions")
}
