//! Attachment filter sets applied before eligibility checks.

use crate::model::RawAttachment;

type Predicate = Box<dyn Fn(&RawAttachment) -> bool + Send + Sync>;

/// Externally supplied filtering of the raw attachment list.
pub trait FilterSet: Send + Sync {
    fn apply(&self, attachments: &[RawAttachment]) -> Vec<RawAttachment>;
}

/// Lets every attachment through.
pub struct NoFilters;

impl FilterSet for NoFilters {
    fn apply(&self, attachments: &[RawAttachment]) -> Vec<RawAttachment> {
        attachments.to_vec()
    }
}

struct NamedFilter {
    name: String,
    active: bool,
    predicate: Predicate,
}

/// Named predicates that can be switched on and off; an attachment passes
/// when it satisfies every active predicate.
#[derive(Default)]
pub struct PredicateFilters {
    filters: Vec<NamedFilter>,
}

impl PredicateFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active filter. A filter with the same name is replaced.
    pub fn with_filter<F>(mut self, name: &str, predicate: F) -> Self
    where
        F: Fn(&RawAttachment) -> bool + Send + Sync + 'static,
    {
        self.filters.retain(|f| f.name != name);
        self.filters.push(NamedFilter {
            name: name.to_string(),
            active: true,
            predicate: Box::new(predicate),
        });
        self
    }

    /// Switches a filter on or off. Returns false for unknown names.
    pub fn set_active(&mut self, name: &str, active: bool) -> bool {
        match self.filters.iter_mut().find(|f| f.name == name) {
            Some(filter) => {
                filter.active = active;
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.filters.iter().any(|f| f.name == name && f.active)
    }

    fn accepts(&self, attachment: &RawAttachment) -> bool {
        self.filters
            .iter()
            .filter(|f| f.active)
            .all(|f| (f.predicate)(attachment))
    }
}

impl FilterSet for PredicateFilters {
    fn apply(&self, attachments: &[RawAttachment]) -> Vec<RawAttachment> {
        attachments
            .iter()
            .filter(|a| self.accepts(a))
            .cloned()
            .collect()
    }
}
