//! Default grouping of attachments by originating operation.

use std::collections::HashMap;

use crate::model::{Attachment, AttachmentType};

use super::{Group, GroupKey, GroupSet};

/// Externally supplied grouping utility.
pub trait OperationGrouping: Send + Sync {
    fn group_by_operation(
        &self,
        attachments: Vec<Attachment>,
        include_ungrouped: bool,
        allowed_types: &[AttachmentType],
    ) -> GroupSet;
}

/// Groups by operation id in first-appearance order, with the ungrouped
/// group first. Order within a group follows the input order.
///
/// When `allowed_types` is non-empty, attachments whose type is not allowed
/// for the application are not attributed to an operation.
pub struct OperationGrouper;

impl OperationGrouping for OperationGrouper {
    fn group_by_operation(
        &self,
        attachments: Vec<Attachment>,
        include_ungrouped: bool,
        allowed_types: &[AttachmentType],
    ) -> GroupSet {
        let mut ungrouped = Group::ungrouped();
        let mut operations: Vec<Group> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for attachment in attachments {
            let type_allowed = allowed_types.is_empty()
                || attachment
                    .attachment_type
                    .as_ref()
                    .is_some_and(|t| allowed_types.contains(t));

            let operation = attachment.operation.clone().filter(|_| type_allowed);
            match operation {
                Some(op) => {
                    let slot = *index.entry(op.id.clone()).or_insert_with(|| {
                        operations.push(Group::for_operation(&op));
                        operations.len() - 1
                    });
                    operations[slot].attachments.push(attachment);
                }
                None if include_ungrouped => ungrouped.attachments.push(attachment),
                None => {
                    log::debug!(
                        "Leaving out attachment {} without an operation",
                        attachment.id
                    );
                }
            }
        }

        let mut groups = Vec::with_capacity(operations.len() + 1);
        if !ungrouped.attachments.is_empty() {
            groups.push(ungrouped);
        }
        groups.extend(operations);
        groups
    }
}

impl Group {
    fn ungrouped() -> Self {
        Self {
            key: GroupKey::Ungrouped,
            name: GroupKey::UNGROUPED_NAME.to_string(),
            description: None,
            attachments: Vec::new(),
        }
    }

    fn for_operation(op: &crate::model::OperationRef) -> Self {
        Self {
            key: GroupKey::Operation(op.id.clone()),
            name: op.name.clone().unwrap_or_else(|| op.id.clone()),
            description: op.description.clone(),
            attachments: Vec::new(),
        }
    }
}
