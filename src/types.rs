//! Coarse column type inference.

use crate::ast::ColumnType;

const NUMBER_MARKERS: &[&str] = &["int", "num", "dec", "float", "real", "double", "serial"];

/// Non-numeric type names that contain a number marker.
const TEXT_TYPE_NAMES: &[&str] = &["enum", "point"];

/// Infer a coarse type from the type portion of a column definition.
///
/// A numeric marker anywhere in the text makes it a number, unless the type
/// name itself is known to be textual. Character types and anything
/// unrecognised are text.
pub fn infer_type(type_text: &str) -> ColumnType {
    let lower = type_text.to_lowercase();
    let name = lower
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or("");

    if TEXT_TYPE_NAMES.contains(&name) {
        ColumnType::Text
    } else if NUMBER_MARKERS.iter().any(|m| lower.contains(m)) {
        ColumnType::Number
    } else {
        ColumnType::Text
    }
}
