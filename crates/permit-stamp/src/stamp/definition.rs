//! Organization stamp definitions and the registry that tracks which one is
//! active.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};

/// Which pages of a document receive the stamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSelector {
    #[default]
    First,
    Last,
    All,
}

impl PageSelector {
    pub const ALL: [PageSelector; 3] = [PageSelector::First, PageSelector::Last, PageSelector::All];
}

impl fmt::Display for PageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelector::First => write!(f, "first"),
            PageSelector::Last => write!(f, "last"),
            PageSelector::All => write!(f, "all"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampPosition {
    pub x: i64,
    pub y: i64,
}

/// A stamp template as configured for the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampDefinition {
    pub id: String,
    /// Default section label.
    pub name: String,
    #[serde(default)]
    pub position: StampPosition,
    #[serde(default)]
    pub page: PageSelector,
    /// Transparency, 0..=255.
    #[serde(default)]
    pub background: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    /// Stamp date, epoch millis.
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub extra_info: Option<String>,
    #[serde(default)]
    pub kuntalupatunnus: Option<String>,
}

/// The editable part of a definition that is written back on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampLayout {
    pub position: StampPosition,
    pub page: PageSelector,
    pub background: i64,
}

impl StampDefinition {
    pub fn with_layout(&self, layout: StampLayout) -> Self {
        Self {
            position: layout.position,
            page: layout.page,
            background: Some(layout.background),
            ..self.clone()
        }
    }
}

/// Immutable definitions plus an explicit current index. Updates replace a
/// record by id.
#[derive(Debug, Clone)]
pub struct StampRegistry {
    definitions: Vec<StampDefinition>,
    current: usize,
}

impl StampRegistry {
    pub fn new(definitions: Vec<StampDefinition>) -> Result<Self, ConfigError> {
        if definitions.is_empty() {
            return Err(ConfigError::Validation {
                message: "At least one stamp definition is required".to_string(),
            });
        }

        let mut ids = HashSet::new();
        for definition in &definitions {
            if !ids.insert(definition.id.as_str()) {
                return Err(ConfigError::InvalidStamp {
                    id: definition.id.clone(),
                    reason: "Duplicate stamp ID".to_string(),
                });
            }
        }

        Ok(Self {
            definitions,
            current: 0,
        })
    }

    pub fn current(&self) -> &StampDefinition {
        &self.definitions[self.current]
    }

    pub fn get(&self, id: &str) -> Option<&StampDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn definitions(&self) -> &[StampDefinition] {
        &self.definitions
    }

    /// Makes `id` the current definition.
    pub fn select(&mut self, id: &str) -> Result<&StampDefinition, ValidationError> {
        let index = self
            .definitions
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| ValidationError::UnknownStamp(id.to_string()))?;
        self.current = index;
        Ok(&self.definitions[index])
    }

    /// Replaces the layout of definition `id`.
    pub fn update_layout(&mut self, id: &str, layout: StampLayout) -> Result<(), ValidationError> {
        let slot = self
            .definitions
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| ValidationError::UnknownStamp(id.to_string()))?;
        *slot = slot.with_layout(layout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(id: &str) -> StampDefinition {
        StampDefinition {
            id: id.to_string(),
            name: format!("{} section", id),
            position: StampPosition { x: 10, y: 200 },
            page: PageSelector::First,
            background: None,
            text: None,
            date: None,
            organization: None,
            extra_info: None,
            kuntalupatunnus: None,
        }
    }

    #[test]
    fn test_registry_requires_definitions() {
        assert!(StampRegistry::new(vec![]).is_err());
    }

    #[test]
    fn test_registry_rejects_duplicate_ids() {
        let result = StampRegistry::new(vec![definition("s1"), definition("s1")]);
        assert!(matches!(result, Err(ConfigError::InvalidStamp { id, .. }) if id == "s1"));
    }

    #[test]
    fn test_select_and_update_by_id() {
        let mut registry = StampRegistry::new(vec![definition("s1"), definition("s2")]).unwrap();
        assert_eq!(registry.current().id, "s1");

        registry.select("s2").unwrap();
        assert_eq!(registry.current().id, "s2");

        registry
            .update_layout(
                "s1",
                StampLayout {
                    position: StampPosition { x: 1, y: 2 },
                    page: PageSelector::All,
                    background: 51,
                },
            )
            .unwrap();
        let s1 = registry.get("s1").unwrap();
        assert_eq!(s1.position, StampPosition { x: 1, y: 2 });
        assert_eq!(s1.page, PageSelector::All);
        assert_eq!(s1.background, Some(51));
        assert_eq!(registry.current().id, "s2");
    }

    #[test]
    fn test_select_unknown() {
        let mut registry = StampRegistry::new(vec![definition("s1")]).unwrap();
        assert_eq!(
            registry.select("nope").unwrap_err(),
            ValidationError::UnknownStamp("nope".to_string())
        );
        assert_eq!(registry.current().id, "s1");
    }

    #[test]
    fn test_definition_from_api_json() {
        let json = r#"{
            "id": "stamp-1",
            "name": "§ 12",
            "position": {"x": 10, "y": 200},
            "page": "last",
            "background": 102,
            "text": "Hyväksytty",
            "organization": "Sipoon rakennusvalvonta"
        }"#;
        let parsed: StampDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.page, PageSelector::Last);
        assert_eq!(parsed.background, Some(102));
        assert!(parsed.extra_info.is_none());
    }
}
