//! Selection flags over the grouped attachments, threaded by attachment id
//! through every recomputation.

use std::collections::HashMap;

use serde::Serialize;

use crate::grouping::{Group, GroupKey, GroupedAttachments, Partition};
use crate::model::{Attachment, AttachmentStatus};

/// Addresses one group; the same operation can appear in both partitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupRef {
    pub partition: Partition,
    pub key: GroupKey,
}

impl GroupRef {
    pub fn new(partition: Partition, key: GroupKey) -> Self {
        Self { partition, key }
    }
}

/// What a recomputation did to the previous selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeSummary {
    pub retained: usize,
    pub added: usize,
    pub dropped: usize,
}

#[derive(Debug)]
pub struct SelectionState {
    groups: GroupedAttachments,
    editable: bool,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            groups: GroupedAttachments::default(),
            editable: true,
        }
    }

    pub fn groups(&self) -> &GroupedAttachments {
        &self.groups
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Set by the workflow whenever its state changes.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Swaps in a freshly grouped set. Attachments that are still eligible
    /// keep their selection and job fields; ones that disappeared are
    /// dropped. While frozen, newcomers start deselected.
    pub fn replace(&mut self, mut next: GroupedAttachments) -> RecomputeSummary {
        let previous = std::mem::take(&mut self.groups);
        let mut by_id: HashMap<String, Attachment> = HashMap::new();
        for group in previous.pre.into_iter().chain(previous.post) {
            for attachment in group.attachments {
                by_id.insert(attachment.id.clone(), attachment);
            }
        }

        let mut summary = RecomputeSummary::default();
        for attachment in next.attachments_mut() {
            match by_id.remove(&attachment.id) {
                Some(old) => {
                    attachment.inherit_state(&old);
                    summary.retained += 1;
                }
                None => {
                    if !self.editable {
                        attachment.selected = false;
                    }
                    summary.added += 1;
                }
            }
        }
        summary.dropped = by_id.len();

        if summary.dropped > 0 {
            log::debug!(
                "{} attachments are no longer eligible and left the selection",
                summary.dropped
            );
        }

        self.groups = next;
        summary
    }

    pub fn get(&self, id: &str) -> Option<&Attachment> {
        self.groups.attachments().find(|a| a.id == id)
    }

    pub fn group(&self, group: &GroupRef) -> Option<&Group> {
        self.groups
            .partition(group.partition)
            .iter()
            .find(|g| g.key == group.key)
    }

    /// Flips one attachment. Returns whether anything changed.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.editable {
            log::debug!("Ignoring toggle of {}: selection is frozen", id);
            return false;
        }
        match self.groups.attachments_mut().find(|a| a.id == id) {
            Some(attachment) => {
                attachment.selected = !attachment.selected;
                true
            }
            None => false,
        }
    }

    /// Selects every member unless all are already selected, in which case
    /// every member is deselected.
    pub fn toggle_group(&mut self, group: &GroupRef) -> bool {
        if !self.editable {
            log::debug!("Ignoring group toggle of {}: selection is frozen", group.key);
            return false;
        }
        let groups = match group.partition {
            Partition::Pre => &mut self.groups.pre,
            Partition::Post => &mut self.groups.post,
        };
        match groups.iter_mut().find(|g| g.key == group.key) {
            Some(g) => {
                let value = !g.group_selected();
                for attachment in &mut g.attachments {
                    attachment.selected = value;
                }
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) -> bool {
        self.set_all(true)
    }

    pub fn select_none(&mut self) -> bool {
        self.set_all(false)
    }

    fn set_all(&mut self, value: bool) -> bool {
        if !self.editable {
            return false;
        }
        for attachment in self.groups.attachments_mut() {
            attachment.selected = value;
        }
        true
    }

    /// Pre-verdict selection followed by post-verdict selection.
    pub fn selected_attachments(&self) -> Vec<&Attachment> {
        self.groups.attachments().filter(|a| a.selected).collect()
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.groups
            .attachments()
            .filter(|a| a.selected)
            .map(|a| a.id.clone())
            .collect()
    }

    pub fn all_selected(&self) -> bool {
        self.groups.attachments().all(|a| a.selected)
    }

    /// Any selected attachment whose latest version is already stamped,
    /// either upstream or by an earlier job in this session.
    pub fn needs_restamp_confirmation(&self) -> bool {
        self.groups
            .attachments()
            .any(|a| a.selected && (a.restamp || a.stamped))
    }

    pub fn eligible_count(&self) -> usize {
        self.groups.len()
    }

    /// Writes a job result onto a selected attachment. Results for
    /// attachments outside the selection are ignored.
    pub fn apply_job_result(
        &mut self,
        id: &str,
        status: AttachmentStatus,
        file_id: Option<String>,
    ) -> bool {
        match self
            .groups
            .attachments_mut()
            .find(|a| a.id == id && a.selected)
        {
            Some(attachment) => {
                attachment.status = status;
                attachment.file_id = file_id;
                true
            }
            None => false,
        }
    }

    /// Marks every selected attachment stamped; returns how many.
    pub fn mark_selected_stamped(&mut self) -> usize {
        let mut count = 0;
        for attachment in self.groups.attachments_mut().filter(|a| a.selected) {
            attachment.stamped = true;
            count += 1;
        }
        count
    }
}
