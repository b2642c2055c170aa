//! XML text helpers shared by the package and presentation layers.
mod escape;

pub use escape::{escape_xml, escape_xml_text, resolve_entity, unescape_xml};
