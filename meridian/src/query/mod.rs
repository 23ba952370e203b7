//! Attribute filtering and export.
//!
//! A filter is a single string without boolean composition:
//!
//! * empty (or whitespace only) matches everything,
//! * `column=value` matches features whose `column` contains `value`,
//! * anything else matches features with any attribute containing the text.
//!
//! All comparisons are case-insensitive substring matches on the displayed value of the property, so missing and
//! `null` values compare as empty strings.

mod attribute_table;

pub use attribute_table::{export_file_name, AttributeTable};

use crate::feature::{self, FID_PROPERTY};
use geojson::Feature;
use std::str::FromStr;

/// Parsed filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    /// Matches every feature.
    #[default]
    All,
    /// Matches features whose `column` value contains `value`.
    Column {
        /// Property name.
        column: String,
        /// Case-folded value to search for.
        value: String,
    },
    /// Matches features with any attribute value containing the (case-folded) text.
    Text(String),
}

impl Filter {
    /// Parses a filter expression. Never fails.
    pub fn parse(expression: &str) -> Self {
        let expression = expression.trim();
        if expression.is_empty() {
            return Filter::All;
        }

        match expression.split_once('=') {
            Some((column, value)) if !column.is_empty() => Filter::Column {
                column: column.trim().to_string(),
                value: value.trim().to_lowercase(),
            },
            _ => Filter::Text(expression.to_lowercase()),
        }
    }

    /// Returns true if the feature passes the filter.
    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            Filter::All => true,
            Filter::Column { column, value } => {
                if column == FID_PROPERTY {
                    return false;
                }
                feature::property_value(feature, column)
                    .to_lowercase()
                    .contains(value.as_str())
            }
            Filter::Text(text) => feature::attributes(feature).any(|(_, value)| {
                feature::display_value(Some(value))
                    .to_lowercase()
                    .contains(text.as_str())
            }),
        }
    }

    /// Features passing the filter, in their original order.
    pub fn apply<'a>(&'a self, features: &'a [Feature]) -> impl Iterator<Item = &'a Feature> + 'a {
        features.iter().filter(move |f| self.matches(f))
    }
}

impl FromStr for Filter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Union of attribute names of the features in first-seen order. The feature id is not included.
pub fn columns<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Vec<String> {
    let mut columns: Vec<String> = vec![];
    for f in features {
        for (key, _) in feature::attributes(f) {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::normalize;
    use serde_json::json;

    fn features(properties: serde_json::Value) -> Vec<Feature> {
        let items: Vec<_> = properties
            .as_array()
            .expect("array expected")
            .iter()
            .map(|p| json!({ "type": "Feature", "geometry": null, "properties": p }))
            .collect();
        normalize(serde_json::Value::Array(items)).features
    }

    fn matching(filter: &str, features: &[Feature]) -> Vec<usize> {
        let filter = Filter::parse(filter);
        features
            .iter()
            .enumerate()
            .filter(|(_, f)| filter.matches(f))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn parse() {
        assert_eq!(Filter::parse(""), Filter::All);
        assert_eq!(Filter::parse("   "), Filter::All);
        assert_eq!(
            Filter::parse(" name = Main St "),
            Filter::Column {
                column: "name".into(),
                value: "main st".into()
            }
        );
        assert_eq!(
            Filter::parse("a=b=c"),
            Filter::Column {
                column: "a".into(),
                value: "b=c".into()
            }
        );
        assert_eq!(Filter::parse("=x"), Filter::Text("=x".into()));
        assert_eq!(Filter::parse("Road"), Filter::Text("road".into()));
        assert_eq!("a=".parse::<Filter>(), Ok(Filter::Column { column: "a".into(), value: String::new() }));
    }

    #[test]
    fn column_and_text_filters() {
        let features = features(json!([{ "a": "x" }, { "a": "y" }]));
        assert_eq!(matching("a=x", &features), [0]);
        assert_eq!(matching("x", &features), [0]);
        assert_eq!(matching("", &features), [0, 1]);
    }

    #[test]
    fn case_insensitive_substring() {
        let features = features(json!([
            { "name": "Main Street", "lanes": 4 },
            { "name": "Side street", "lanes": 1 },
            { "name": null, "lanes": 2 },
        ]));
        assert_eq!(matching("name=STREET", &features), [0, 1]);
        assert_eq!(matching("name=main", &features), [0]);
        assert_eq!(matching("lanes=4", &features), [0]);
        assert_eq!(matching("name=", &features), [0, 1, 2]);
        assert_eq!(matching("missing=x", &features), Vec::<usize>::new());
        assert_eq!(matching("missing=", &features), [0, 1, 2]);
        assert_eq!(matching("2", &features), [2]);
    }

    #[test]
    fn fid_is_not_searchable() {
        let features = features(json!([{ "_fid": 5, "name": "a" }]));
        assert_eq!(matching("5", &features), Vec::<usize>::new());
        assert_eq!(matching("_fid=5", &features), Vec::<usize>::new());
    }

    #[test]
    fn columns_first_seen_order() {
        let features = features(json!([{ "_fid": 0, "b": 1 }, { "a": 1, "b": 2 }, {}]));
        assert_eq!(columns(&features), ["b", "a"]);
        assert!(columns(&[]).is_empty());
    }
}
