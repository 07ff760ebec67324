//! Stamp definitions and the form used to configure a stamping run.

pub mod definition;
pub mod editor;

pub use definition::{PageSelector, StampDefinition, StampLayout, StampPosition, StampRegistry};
pub use editor::{
    parse_leading_int, transparency_options, StampConfiguration, StampEditor, StampForm,
    TransparencyOption, EMPTY_SECTION_GLYPH,
};
