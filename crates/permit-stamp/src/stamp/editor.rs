//! The stamp form: field values for the active definition, validation and
//! coercion into a submittable configuration.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ValidationError;

use super::definition::{PageSelector, StampDefinition, StampLayout, StampPosition, StampRegistry};

/// Section value the UI shows for "no section".
pub const EMPTY_SECTION_GLYPH: &str = "\u{00a7}";

const TRANSPARENCY_PERCENTAGES: [u32; 5] = [0, 20, 40, 60, 80];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransparencyOption {
    pub percent: u32,
    pub value: u8,
}

/// Selectable transparency levels, scaled to 0..=255.
pub fn transparency_options() -> Vec<TransparencyOption> {
    TRANSPARENCY_PERCENTAGES
        .iter()
        .map(|&percent| TransparencyOption {
            percent,
            value: (255.0 * f64::from(percent) / 100.0).round() as u8,
        })
        .collect()
}

/// A validated snapshot of the form, ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampConfiguration {
    pub text: String,
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

/// Raw form values as the user edits them. Margins are kept as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampForm {
    pub text: String,
    pub date: Option<DateTime<Utc>>,
    pub organization: String,
    pub x_margin: String,
    pub y_margin: String,
    pub page: PageSelector,
    pub transparency: i64,
    pub extra_info: String,
    pub kuntalupatunnus: String,
    pub section: String,
}

impl StampForm {
    fn from_definition(definition: &StampDefinition) -> Self {
        let mut form = Self {
            text: definition.text.clone().unwrap_or_default(),
            date: definition.date.and_then(DateTime::from_timestamp_millis),
            organization: definition.organization.clone().unwrap_or_default(),
            x_margin: String::new(),
            y_margin: String::new(),
            page: PageSelector::default(),
            transparency: 0,
            extra_info: definition.extra_info.clone().unwrap_or_default(),
            kuntalupatunnus: definition.kuntalupatunnus.clone().unwrap_or_default(),
            section: String::new(),
        };
        form.load_layout(definition);
        form
    }

    /// Loads the per-definition fields. Text, date, organization and the
    /// permit fields stay as they are.
    fn load_layout(&mut self, definition: &StampDefinition) {
        self.x_margin = definition.position.x.to_string();
        self.y_margin = definition.position.y.to_string();
        self.page = definition.page;
        self.transparency = match definition.background {
            Some(value) if value != 0 => value,
            _ => i64::from(transparency_options()[0].value),
        };
        self.section = definition.name.clone();
    }

    /// The layout to write back, if the current values are storable.
    fn layout(&self) -> Option<StampLayout> {
        let x = parse_margin("xMargin", &self.x_margin).ok()?;
        let y = parse_margin("yMargin", &self.y_margin).ok()?;
        if !(0..=255).contains(&self.transparency) {
            return None;
        }
        Some(StampLayout {
            position: StampPosition { x, y },
            page: self.page,
            background: self.transparency,
        })
    }

    pub fn x_margin_ok(&self) -> bool {
        parse_margin("xMargin", &self.x_margin).is_ok()
    }

    pub fn y_margin_ok(&self) -> bool {
        parse_margin("yMargin", &self.y_margin).is_ok()
    }

    /// Validates and coerces the form.
    pub fn configuration(&self) -> Result<StampConfiguration, ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::MissingField("text"));
        }
        if self.organization.trim().is_empty() {
            return Err(ValidationError::MissingField("organization"));
        }
        let date = self.date.ok_or(ValidationError::MissingField("date"))?;
        let x_margin = parse_margin("xMargin", &self.x_margin)?;
        let y_margin = parse_margin("yMargin", &self.y_margin)?;
        let transparency = u8::try_from(self.transparency)
            .map_err(|_| ValidationError::TransparencyOutOfRange(self.transparency))?;

        Ok(StampConfiguration {
            text: self.text.clone(),
            timestamp_millis: date.timestamp_millis(),
            organization: self.organization.clone(),
            x_margin,
            y_margin,
            page: self.page,
            transparency,
            extra_info: self.extra_info.clone(),
            kuntalupatunnus: self.kuntalupatunnus.clone(),
            section: normalize_section(&self.section),
        })
    }
}

fn normalize_section(section: &str) -> String {
    if section == EMPTY_SECTION_GLYPH {
        String::new()
    } else {
        section.to_string()
    }
}

fn parse_margin(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let parsed = parse_leading_int(value).ok_or_else(|| ValidationError::NotAnInteger {
        field,
        value: value.to_string(),
    })?;
    if parsed < 0 {
        return Err(ValidationError::NegativeMargin {
            field,
            value: parsed,
        });
    }
    Ok(parsed)
}

/// Parses the integer at the start of `input`: optional whitespace, an
/// optional sign, then digits. Anything after the digits is ignored.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// The stamp registry together with the form for its current definition.
///
/// Layout edits (margins, page, transparency) are written back to the
/// current definition as they happen. Switching definitions writes back the
/// pending layout first and then loads the new definition without writing
/// anything.
#[derive(Debug, Clone)]
pub struct StampEditor {
    registry: StampRegistry,
    form: StampForm,
}

impl StampEditor {
    pub fn new(registry: StampRegistry) -> Self {
        let form = StampForm::from_definition(registry.current());
        Self { registry, form }
    }

    pub fn registry(&self) -> &StampRegistry {
        &self.registry
    }

    pub fn form(&self) -> &StampForm {
        &self.form
    }

    pub fn current_id(&self) -> &str {
        &self.registry.current().id
    }

    pub fn select_stamp(&mut self, id: &str) -> Result<(), ValidationError> {
        if self.registry.get(id).is_none() {
            return Err(ValidationError::UnknownStamp(id.to_string()));
        }
        self.persist_layout();
        let definition = self.registry.select(id)?;
        self.form.load_layout(definition);
        log::debug!("Switched stamp definition to {}", id);
        Ok(())
    }

    pub fn set_x_margin(&mut self, value: &str) {
        self.form.x_margin = value.to_string();
        self.persist_layout();
    }

    pub fn set_y_margin(&mut self, value: &str) {
        self.form.y_margin = value.to_string();
        self.persist_layout();
    }

    pub fn set_page(&mut self, page: PageSelector) {
        self.form.page = page;
        self.persist_layout();
    }

    pub fn set_transparency(&mut self, value: i64) {
        self.form.transparency = value;
        self.persist_layout();
    }

    pub fn set_section(&mut self, section: &str) {
        self.form.section = section.to_string();
    }

    pub fn set_text(&mut self, text: &str) {
        self.form.text = text.to_string();
    }

    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.form.date = Some(date);
    }

    pub fn set_organization(&mut self, organization: &str) {
        self.form.organization = organization.to_string();
    }

    pub fn set_extra_info(&mut self, extra_info: &str) {
        self.form.extra_info = extra_info.to_string();
    }

    pub fn set_kuntalupatunnus(&mut self, kuntalupatunnus: &str) {
        self.form.kuntalupatunnus = kuntalupatunnus.to_string();
    }

    pub fn configuration(&self) -> Result<StampConfiguration, ValidationError> {
        self.form.configuration()
    }

    fn persist_layout(&mut self) {
        let Some(layout) = self.form.layout() else {
            log::debug!("Not storing stamp layout: form has invalid values");
            return;
        };
        let id = self.registry.current().id.clone();
        if let Err(e) = self.registry.update_layout(&id, layout) {
            log::warn!("Failed to store stamp layout for {}: {}", id, e);
        }
    }
}
