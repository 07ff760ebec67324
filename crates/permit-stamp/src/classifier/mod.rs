//! Decides which attachments can be stamped and annotates them for display.

pub mod filters;

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::config::StampingSettings;
use crate::model::{Attachment, RawAttachment};

pub use filters::{FilterSet, NoFilters, PredicateFilters};

pub struct Classifier {
    stampable_mimes: HashSet<String>,
}

impl Classifier {
    pub fn new<I, S>(stampable_mimes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stampable_mimes: stampable_mimes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_settings(settings: &StampingSettings) -> Self {
        Self::new(settings.stampable_mimes.iter().cloned())
    }

    /// Not every version is stamped and the latest version has a
    /// stampable content type.
    pub fn is_stampable(&self, attachment: &RawAttachment) -> bool {
        if attachment.all_versions_stamped() {
            return false;
        }
        attachment
            .latest_content_type()
            .is_some_and(|ct| self.stampable_mimes.contains(ct))
    }

    /// Orders, filters and annotates the raw list. The input is left as is.
    pub fn classify(&self, raw: &[RawAttachment], filters: &dyn FilterSet) -> Vec<Attachment> {
        let ordered = ordered_for_stamping(raw);
        let filtered = filters.apply(&ordered);
        let filtered_count = filtered.len();

        let eligible: Vec<Attachment> = filtered
            .iter()
            .filter(|a| self.is_stampable(a))
            .filter_map(|a| {
                let annotated = Attachment::from_raw(a);
                if annotated.is_none() {
                    log::debug!("Skipping attachment {} with malformed versions", a.id);
                }
                annotated
            })
            .collect();

        log::debug!(
            "Classified {} attachments: {} after filters, {} eligible",
            raw.len(),
            filtered_count,
            eligible.len()
        );

        eligible
    }
}

/// Sorted by attachment type, newest first within a type.
fn ordered_for_stamping(raw: &[RawAttachment]) -> Vec<RawAttachment> {
    let mut ordered = raw.to_vec();
    ordered.sort_by_key(|a| {
        (
            a.attachment_type.clone(),
            Reverse(a.modified.unwrap_or(i64::MIN)),
        )
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttachmentType, AttachmentVersion};

    fn version(content_type: &str, stamped: bool) -> AttachmentVersion {
        AttachmentVersion {
            content_type: Some(content_type.to_string()),
            filename: Some("file.pdf".to_string()),
            size: Some(100),
            stamped,
            version: None,
            file_id: None,
        }
    }

    fn raw(id: &str, versions: Vec<AttachmentVersion>) -> RawAttachment {
        RawAttachment {
            id: id.to_string(),
            attachment_type: None,
            modified: None,
            for_printing: false,
            op: None,
            latest_version: versions.last().cloned(),
            versions: Some(versions),
            application_state: None,
        }
    }

    fn classifier() -> Classifier {
        Classifier::new(["application/pdf", "image/png"])
    }

    #[test]
    fn test_fully_stamped_is_not_eligible() {
        let list = vec![raw(
            "a",
            vec![version("application/pdf", true), version("application/pdf", true)],
        )];
        assert!(classifier().classify(&list, &NoFilters).is_empty());
    }

    #[test]
    fn test_unlisted_content_type_is_not_eligible() {
        let list = vec![raw("a", vec![version("application/msword", false)])];
        assert!(classifier().classify(&list, &NoFilters).is_empty());
    }

    #[test]
    fn test_content_type_of_latest_version_decides() {
        let list = vec![raw(
            "a",
            vec![version("application/msword", false), version("image/png", false)],
        )];
        let eligible = classifier().classify(&list, &NoFilters);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].content_type, "image/png");
    }

    #[test]
    fn test_missing_latest_version_is_excluded() {
        let mut a = raw("a", vec![version("application/pdf", false)]);
        a.latest_version = None;
        let mut b = raw("b", vec![]);
        b.latest_version = Some(version("application/pdf", false));

        assert!(classifier().classify(&[a, b], &NoFilters).is_empty());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let list = vec![
            raw("b", vec![version("application/pdf", false)]),
            raw("a", vec![version("application/pdf", false)]),
        ];
        let before = list.clone();
        let _ = classifier().classify(&list, &NoFilters);
        assert_eq!(list, before);
    }

    #[test]
    fn test_filters_run_before_eligibility() {
        let list = vec![
            raw("a", vec![version("application/pdf", false)]),
            raw("b", vec![version("application/pdf", false)]),
        ];
        let filters = PredicateFilters::new().with_filter("only-b", |a| a.id == "b");
        let eligible = classifier().classify(&list, &filters);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, "b");
    }

    #[test]
    fn test_ordering_by_type_then_newest_first() {
        let mut old = raw("old", vec![version("application/pdf", false)]);
        old.attachment_type = Some(AttachmentType::new("paapiirustus", "pohjapiirustus"));
        old.modified = Some(100);
        let mut new = raw("new", vec![version("application/pdf", false)]);
        new.attachment_type = Some(AttachmentType::new("paapiirustus", "pohjapiirustus"));
        new.modified = Some(200);
        let mut other = raw("other", vec![version("application/pdf", false)]);
        other.attachment_type = Some(AttachmentType::new("hakija", "valtakirja"));
        other.modified = Some(50);

        let ids: Vec<String> = classifier()
            .classify(&[old, new, other], &NoFilters)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["other", "new", "old"]);
    }
}
