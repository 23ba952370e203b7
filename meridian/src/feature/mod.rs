//! Features, their stable identifiers and property access.
//!
//! Features are plain [`geojson::Feature`] values. Every feature stored in a layer carries its identifier (`fid`) in
//! the reserved [`FID_PROPERTY`] property. The identifier is not a user attribute: it is skipped by
//! [`attributes`], column enumeration, filtering and export.

mod normalize;

pub use normalize::{normalize, normalize_geojson, normalize_with_report, Normalized};

use geojson::{Feature, JsonValue};

/// Name of the reserved property holding the feature identifier.
pub const FID_PROPERTY: &str = "_fid";

/// Feature identifier, unique within a layer.
pub type Fid = u64;

/// Identifier of the feature, if it has a valid one.
pub fn fid(feature: &Feature) -> Option<Fid> {
    feature
        .properties
        .as_ref()?
        .get(FID_PROPERTY)
        .and_then(JsonValue::as_u64)
}

/// Sets the identifier of the feature, creating the properties map if needed.
pub fn set_fid(feature: &mut Feature, fid: Fid) {
    feature
        .properties
        .get_or_insert_with(Default::default)
        .insert(FID_PROPERTY.to_string(), JsonValue::from(fid));
}

/// User-visible properties of the feature, in their original order.
pub fn attributes(feature: &Feature) -> impl Iterator<Item = (&String, &JsonValue)> {
    feature
        .properties
        .iter()
        .flatten()
        .filter(|(key, _)| key.as_str() != FID_PROPERTY)
}

/// Value of the property as displayed to the user. Missing and `null` values are empty strings; strings are not
/// quoted; other values use their JSON representation.
pub fn display_value(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Display value of a named property of the feature.
pub fn property_value(feature: &Feature, name: &str) -> String {
    display_value(feature.properties.as_ref().and_then(|p| p.get(name)))
}

/// Popup text of the feature: one `key: value` line per attribute.
pub fn summary(feature: &Feature) -> String {
    attributes(feature)
        .map(|(key, value)| format!("{key}: {}", display_value(Some(value))))
        .collect::<Vec<_>>()
        .join("\n")
}
