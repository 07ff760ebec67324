//! Partitions eligible attachments into pre-/post-verdict buckets and groups
//! each bucket by originating operation.

pub mod operation;

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::config::StampingSettings;
use crate::model::{Attachment, AttachmentType};

pub use operation::{OperationGrouper, OperationGrouping};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "id")]
pub enum GroupKey {
    Ungrouped,
    Operation(String),
}

impl GroupKey {
    pub const UNGROUPED_NAME: &'static str = "ungrouped";
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Ungrouped => f.write_str(Self::UNGROUPED_NAME),
            GroupKey::Operation(id) => write!(f, "operation:{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub key: GroupKey,
    /// `groupName` in the UI.
    pub name: String,
    /// `groupDesc` in the UI.
    pub description: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl Group {
    /// Derived on every call; true iff every member is selected.
    pub fn group_selected(&self) -> bool {
        self.attachments.iter().all(|a| a.selected)
    }
}

pub type GroupSet = Vec<Group>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Pre,
    Post,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedAttachments {
    pub pre: GroupSet,
    pub post: GroupSet,
}

impl GroupedAttachments {
    pub fn partition(&self, partition: Partition) -> &GroupSet {
        match partition {
            Partition::Pre => &self.pre,
            Partition::Post => &self.post,
        }
    }

    /// Every attachment, pre-verdict groups first.
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.pre
            .iter()
            .chain(self.post.iter())
            .flat_map(|g| g.attachments.iter())
    }

    pub fn attachments_mut(&mut self) -> impl Iterator<Item = &mut Attachment> {
        self.pre
            .iter_mut()
            .chain(self.post.iter_mut())
            .flat_map(|g| g.attachments.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.attachments().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct GroupingPipeline {
    post_verdict_states: HashSet<String>,
    grouping: Box<dyn OperationGrouping>,
}

impl GroupingPipeline {
    pub fn new<I, S>(post_verdict_states: I, grouping: Box<dyn OperationGrouping>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            post_verdict_states: post_verdict_states.into_iter().map(Into::into).collect(),
            grouping,
        }
    }

    pub fn from_settings(settings: &StampingSettings) -> Self {
        Self::new(
            settings.post_verdict_states.iter().cloned(),
            Box::new(OperationGrouper),
        )
    }

    pub fn partition_of(&self, attachment: &Attachment) -> Partition {
        match &attachment.application_state {
            Some(state) if self.post_verdict_states.contains(state) => Partition::Post,
            _ => Partition::Pre,
        }
    }

    /// Splits by verdict state, then groups each side by operation.
    /// Ungrouped attachments are always kept.
    pub fn group(
        &self,
        eligible: Vec<Attachment>,
        allowed_types: &[AttachmentType],
    ) -> GroupedAttachments {
        let (post, pre): (Vec<Attachment>, Vec<Attachment>) = eligible
            .into_iter()
            .partition(|a| self.partition_of(a) == Partition::Post);

        GroupedAttachments {
            pre: self.grouping.group_by_operation(pre, true, allowed_types),
            post: self.grouping.group_by_operation(post, true, allowed_types),
        }
    }
}
